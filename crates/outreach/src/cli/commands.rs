//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands and turns their
//! arguments into library types.

use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::{Args, Subcommand, ValueEnum};

use crate::entry::{Counts, EntryForm, Geolocation, Medicines};
use crate::error::ValidationError;
use crate::export::ExportFormat;

/// Doctor registry commands.
#[derive(Debug, Subcommand)]
pub enum DoctorCommand {
    /// List registered doctors
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Register a doctor
    Add {
        /// Full name of the doctor
        name: String,
    },

    /// Remove a doctor not used by any entry
    Delete {
        /// Name of the doctor to remove
        name: String,
    },
}

/// Submit command arguments: one camp entry.
///
/// Text fields default to empty so that missing values surface as
/// validation messages rather than argument errors.
#[derive(Debug, Args)]
pub struct SubmitCommand {
    /// Place of camp
    #[arg(long, default_value = "")]
    pub place: String,

    /// Date of camp (YYYY-MM-DD), defaults to today
    #[arg(long, value_name = "DATE")]
    pub camp_date: Option<NaiveDate>,

    /// Administrator name
    #[arg(long, default_value = "")]
    pub administrator: String,

    /// Doctor name, as registered
    #[arg(long)]
    pub doctor: Option<String>,

    /// Optometrist name
    #[arg(long, default_value = "")]
    pub optom: String,

    /// Optometry intern name
    #[arg(long, default_value = "")]
    pub optom_intern: String,

    /// Male outpatients
    #[arg(long, default_value_t = 0)]
    pub opd_male: u32,

    /// Female outpatients
    #[arg(long, default_value_t = 0)]
    pub opd_female: u32,

    /// Male patients selected for surgery
    #[arg(long, default_value_t = 0)]
    pub surgery_male: u32,

    /// Female patients selected for surgery
    #[arg(long, default_value_t = 0)]
    pub surgery_female: u32,

    /// Male patients brought to hospital
    #[arg(long, default_value_t = 0)]
    pub hospital_male: u32,

    /// Female patients brought to hospital
    #[arg(long, default_value_t = 0)]
    pub hospital_female: u32,

    /// Ciplox given
    #[arg(long, default_value_t = 0)]
    pub ciplox: u32,

    /// Ciplox D given
    #[arg(long, default_value_t = 0)]
    pub ciplox_d: u32,

    /// CMC given
    #[arg(long, default_value_t = 0)]
    pub cmc: u32,

    /// Fedtive given
    #[arg(long, default_value_t = 0)]
    pub fedtive: u32,

    /// Glucose strips used
    #[arg(long, default_value_t = 0)]
    pub glucose_strips: u32,

    /// Spectacles given
    #[arg(long, default_value_t = 0)]
    pub spectacles: u32,

    /// Camp photo to attach
    #[arg(long, value_name = "FILE")]
    pub photo: Option<PathBuf>,

    /// Latitude from the device GPS
    #[arg(long, allow_negative_numbers = true)]
    pub latitude: Option<f64>,

    /// Longitude from the device GPS
    #[arg(long, allow_negative_numbers = true)]
    pub longitude: Option<f64>,

    /// GPS accuracy in meters
    #[arg(long)]
    pub accuracy: Option<f64>,

    /// Print the saved record as JSON
    #[arg(short, long)]
    pub json: bool,
}

impl SubmitCommand {
    /// Build the entry form these arguments describe.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::IncompleteLocation`] if only part of a
    /// location was given.
    pub fn to_form(&self) -> Result<EntryForm, ValidationError> {
        let camp_date = self
            .camp_date
            .unwrap_or_else(|| Local::now().date_naive());

        Ok(EntryForm {
            place: self.place.clone(),
            camp_date,
            administrator: self.administrator.clone(),
            doctor: self.doctor.clone(),
            optom: self.optom.clone(),
            optom_intern: self.optom_intern.clone(),
            opd: Counts::new(self.opd_male, self.opd_female),
            surgery: Counts::new(self.surgery_male, self.surgery_female),
            hospital: Counts::new(self.hospital_male, self.hospital_female),
            medicines: Medicines {
                ciplox: self.ciplox,
                ciplox_d: self.ciplox_d,
                cmc: self.cmc,
                fedtive: self.fedtive,
                glucose_strips: self.glucose_strips,
            },
            spectacles: self.spectacles,
            location: Geolocation::from_parts(self.latitude, self.longitude, self.accuracy)?,
        })
    }
}

/// Export command arguments.
#[derive(Debug, Args)]
pub struct ExportCommand {
    /// Artifact to produce
    #[arg(value_enum)]
    pub format: ExportFormatArg,

    /// Camp date used in the file name, defaults to today
    #[arg(long, value_name = "DATE")]
    pub camp_date: Option<NaiveDate>,

    /// Place used in the file name
    #[arg(long, default_value = "")]
    pub place: String,

    /// Directory to write the artifact into
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub out: PathBuf,
}

impl ExportCommand {
    /// The camp date for naming, resolved against today.
    #[must_use]
    pub fn camp_date(&self) -> NaiveDate {
        self.camp_date
            .unwrap_or_else(|| Local::now().date_naive())
    }
}

/// Export format argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormatArg {
    /// CSV of all entries
    Csv,
    /// ZIP with the CSV and photos
    Zip,
}

impl From<ExportFormatArg> for ExportFormat {
    fn from(arg: ExportFormatArg) -> Self {
        match arg {
            ExportFormatArg::Csv => Self::Csv,
            ExportFormatArg::Zip => Self::Zip,
        }
    }
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration management commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show configuration file path
    Path,

    /// Validate configuration file
    Validate {
        /// Path to configuration file (defaults to standard location)
        file: Option<PathBuf>,
    },
}
