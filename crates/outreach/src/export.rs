//! Report exporter.
//!
//! Dumps every recorded entry as CSV, or as a ZIP bundle holding that CSV
//! plus the photos the entries reference.

use std::collections::HashSet;
use std::fmt;
use std::io::{Cursor, Write};

use chrono::NaiveDate;
use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::config::ExportConfig;
use crate::entry::CampEntry;
use crate::error::Result;
use crate::photos::PhotoStore;
use crate::storage::schema::ENTRY_COLUMNS;
use crate::storage::Storage;

/// Export artifact kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Plain CSV.
    Csv,
    /// ZIP with CSV and images.
    Zip,
}

impl ExportFormat {
    /// File extension without the dot.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Zip => "zip",
        }
    }

    /// MIME type of the artifact.
    #[must_use]
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Zip => "application/zip",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Suggested download name: `<camp_date>_<place>.<ext>`.
///
/// Both values come from the form being filled in, not from the exported
/// rows. Spaces in the place become underscores.
#[must_use]
pub fn export_file_name(camp_date: NaiveDate, place: &str, format: ExportFormat) -> String {
    format!(
        "{camp_date}_{}.{}",
        place.trim().replace(' ', "_"),
        format.extension()
    )
}

/// Render every entry as UTF-8 CSV with a header row.
///
/// # Errors
///
/// Returns an error if the entries cannot be read.
pub fn to_csv(storage: &Storage) -> Result<Vec<u8>> {
    let entries = storage.all_entries()?;
    Ok(render_csv(&entries).into_bytes())
}

/// Build a ZIP holding the CSV and every distinct referenced photo.
///
/// Photos missing from the photo store are skipped; the CSV still names them.
///
/// # Errors
///
/// Returns an error if entries or photos cannot be read, or the archive
/// cannot be written.
pub fn to_zip_bundle(
    storage: &Storage,
    photos: &PhotoStore,
    config: &ExportConfig,
) -> Result<Vec<u8>> {
    let entries = storage.all_entries()?;
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    zip.start_file(config.csv_name.as_str(), options)?;
    zip.write_all(render_csv(&entries).as_bytes())?;

    let prefix = config.images_prefix.trim_end_matches('/');
    let mut seen = HashSet::new();
    let mut bundled = 0usize;

    for name in entries.iter().filter_map(|e| e.photo_name.as_deref()) {
        if !seen.insert(name) {
            continue;
        }
        let Some(bytes) = photos.read(name)? else {
            debug!("Photo {} not found, leaving it out of the bundle", name);
            continue;
        };
        zip.start_file(format!("{prefix}/{name}"), options)?;
        zip.write_all(&bytes)?;
        bundled += 1;
    }

    let bytes = zip.finish()?.into_inner();
    info!(
        "Bundled {} entries and {} photos ({} bytes)",
        entries.len(),
        bundled,
        bytes.len()
    );
    Ok(bytes)
}

/// CSV text for a set of entries, header first, `\n` line endings.
fn render_csv(entries: &[CampEntry]) -> String {
    let mut lines = Vec::with_capacity(entries.len() + 1);
    lines.push(ENTRY_COLUMNS.join(","));

    for e in entries {
        let fields = [
            e.id.to_string(),
            csv_escape(&e.place),
            csv_escape(&e.camp_date),
            csv_escape(&e.administrator),
            csv_escape(&e.doctor),
            csv_escape(&e.optom),
            csv_escape(&e.optom_intern),
            e.opd_m.to_string(),
            e.opd_f.to_string(),
            e.opd_t.to_string(),
            e.surg_m.to_string(),
            e.surg_f.to_string(),
            e.surg_t.to_string(),
            e.hosp_m.to_string(),
            e.hosp_f.to_string(),
            e.hosp_t.to_string(),
            e.ciplox.to_string(),
            e.ciplox_d.to_string(),
            e.cmc.to_string(),
            e.fedtive.to_string(),
            e.glucose_strips.to_string(),
            e.spectacles.to_string(),
            e.photo_name.as_deref().map(csv_escape).unwrap_or_default(),
            optional_number(e.latitude),
            optional_number(e.longitude),
            optional_number(e.accuracy),
            csv_escape(&e.created_at),
        ];
        lines.push(fields.join(","));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Quote a value if it contains a comma, quote, or line break.
fn csv_escape(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn optional_number(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
