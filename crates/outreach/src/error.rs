//! Error types for outreach.
//!
//! Errors fall into three groups: user-correctable validation failures,
//! referential conflicts in the doctor registry, and storage failures caused
//! by the environment (disk, permissions, lock contention). None of them are
//! fatal to the process.

use std::path::PathBuf;
use thiserror::Error;

/// A rule violated by a submitted form or registry input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required text field was empty after trimming.
    #[error("{field} is required")]
    MissingField {
        /// Name of the empty field.
        field: &'static str,
    },

    /// The doctor selection was left at the placeholder.
    #[error("a doctor must be selected")]
    NoDoctorSelected,

    /// More patients were brought to hospital than were selected for surgery.
    #[error("hospital total ({hospital}) cannot exceed surgery total ({surgery})")]
    HospitalExceedsSurgery {
        /// Derived hospital total.
        hospital: i64,
        /// Derived surgery total.
        surgery: i64,
    },

    /// A doctor name was empty after trimming.
    #[error("doctor name cannot be empty")]
    EmptyDoctorName,

    /// The selection-list placeholder cannot be registered as a doctor.
    #[error("'{0}' is reserved and cannot be used as a doctor name")]
    ReservedDoctorName(String),

    /// The selected doctor is not in the registry.
    #[error("doctor '{0}' is not registered")]
    UnknownDoctor(String),

    /// Only some of latitude, longitude and accuracy were supplied.
    #[error("latitude, longitude and accuracy must be given together")]
    IncompleteLocation,
}

/// The main error type for outreach operations.
#[derive(Error, Debug)]
pub enum Error {
    // === User Errors ===
    /// Submitted input failed validation; nothing was written.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// A doctor still referenced by recorded entries cannot be deleted.
    #[error("doctor '{doctor}' cannot be deleted because it is used in {entries} record(s)")]
    ReferentialConflict {
        /// The doctor name.
        doctor: String,
        /// Number of entries referencing the doctor.
        entries: i64,
    },

    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to bring the schema up to date.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write an uploaded photo.
    #[error("failed to write photo {path}: {source}")]
    PhotoWrite {
        /// Destination path of the photo.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Building a ZIP bundle failed.
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Serialization Errors ===
    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for outreach operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a referential conflict error for a doctor.
    #[must_use]
    pub fn referential_conflict(doctor: impl Into<String>, entries: i64) -> Self {
        Self::ReferentialConflict {
            doctor: doctor.into(),
            entries,
        }
    }

    /// Check if this error is something the operator can correct and retry.
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::ReferentialConflict { .. })
    }

    /// Check if this error came from the database or the file system.
    #[must_use]
    pub fn is_storage_failure(&self) -> bool {
        matches!(
            self,
            Self::DatabaseOpen { .. }
                | Self::DatabaseQuery(_)
                | Self::DatabaseMigration { .. }
                | Self::DirectoryCreate { .. }
                | Self::PhotoWrite { .. }
                | Self::Io(_)
                | Self::Archive(_)
        )
    }

    /// The validation rule that failed, if this is a validation error.
    #[must_use]
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(v) => Some(v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::MissingField { field: "place" };
        assert_eq!(err.to_string(), "place is required");

        let err = ValidationError::HospitalExceedsSurgery {
            hospital: 8,
            surgery: 6,
        };
        assert_eq!(
            err.to_string(),
            "hospital total (8) cannot exceed surgery total (6)"
        );
    }

    #[test]
    fn test_doctor_name_errors_display() {
        let err = ValidationError::ReservedDoctorName("Select".to_string());
        assert!(err.to_string().contains("'Select' is reserved"));

        let err: Error = ValidationError::UnknownDoctor("Dr. X".to_string()).into();
        assert!(err.is_user_error());
        assert!(err.to_string().contains("doctor 'Dr. X' is not registered"));
    }

    #[test]
    fn test_validation_wraps_into_error() {
        let err: Error = ValidationError::NoDoctorSelected.into();
        assert!(err.is_user_error());
        assert!(!err.is_storage_failure());
        assert_eq!(err.validation(), Some(&ValidationError::NoDoctorSelected));
        assert!(err.to_string().contains("a doctor must be selected"));
    }

    #[test]
    fn test_referential_conflict_display() {
        let err = Error::referential_conflict("Dr. Mehta", 3);
        let msg = err.to_string();
        assert!(msg.contains("Dr. Mehta"));
        assert!(msg.contains('3'));
        assert!(err.is_user_error());
        assert!(err.validation().is_none());
    }

    #[test]
    fn test_from_io_error_is_storage_failure() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
        assert!(err.is_storage_failure());
    }

    #[test]
    fn test_photo_write_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::PhotoWrite {
            path: PathBuf::from("/readonly/photo.jpg"),
            source: io_err,
        };
        assert!(err.to_string().contains("/readonly/photo.jpg"));
        assert!(err.is_storage_failure());
    }

    #[test]
    fn test_from_rusqlite_error() {
        let result = rusqlite::Connection::open_with_flags(
            "/nonexistent/path/db.sqlite",
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        );
        if let Err(sqlite_err) = result {
            let err: Error = sqlite_err.into();
            assert!(matches!(err, Error::DatabaseQuery(_)));
            assert!(err.is_storage_failure());
        }
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_database_migration_error_display() {
        let err = Error::DatabaseMigration {
            message: "cannot add column".to_string(),
        };
        assert!(err.to_string().contains("cannot add column"));
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::ConfigValidation {
            message: "csv_name must end with .csv".to_string(),
        };
        assert!(err.to_string().contains("csv_name"));
    }
}
