//! `outreach` - data capture for field outreach camps
//!
//! Records camp details, patient counts, medicine distribution, an optional
//! location and an optional photo into a local `SQLite` database, and exports
//! the accumulated records as CSV or as a ZIP bundle with the photos.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod entry;
pub mod error;
pub mod export;
pub mod logging;
pub mod photos;
pub mod recorder;
pub mod session;
pub mod storage;

pub use config::Config;
pub use entry::{
    CampEntry, Counts, EntryForm, EntryId, Geolocation, Medicines, SubmissionSummary,
    DOCTOR_PLACEHOLDER,
};
pub use error::{Error, Result, ValidationError};
pub use export::{export_file_name, to_csv, to_zip_bundle, ExportFormat};
pub use logging::init_logging;
pub use photos::{PhotoStore, PhotoUpload};
pub use recorder::{Receipt, Recorder};
pub use session::{Banner, BannerLevel, Session};
pub use storage::{doctor_choices, Storage, StorageStats};
