//! Doctor registry.
//!
//! The registry only feeds selection lists. Entries keep their own copy of
//! the doctor name, so the delete-guard compares names rather than ids.

use rusqlite::params;
use tracing::{debug, info};

use super::Storage;
use crate::entry::{EntryForm, DOCTOR_PLACEHOLDER};
use crate::error::{Error, Result, ValidationError};

impl Storage {
    /// All doctor names in lexicographic order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_doctors(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM doctors ORDER BY name")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(names)
    }

    /// Add a doctor, trimming surrounding whitespace.
    ///
    /// Returns `true` if the doctor was inserted and `false` if the name was
    /// already registered.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyDoctorName`] for a blank name,
    /// [`ValidationError::ReservedDoctorName`] for the selection placeholder,
    /// or a storage error if the insert fails.
    pub fn add_doctor(&self, name: &str) -> Result<bool> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyDoctorName.into());
        }
        if name == DOCTOR_PLACEHOLDER {
            return Err(ValidationError::ReservedDoctorName(name.to_string()).into());
        }

        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO doctors (name) VALUES (?1)",
            params![name],
        )?;

        if inserted > 0 {
            info!("Added doctor '{}'", name);
        } else {
            debug!("Doctor '{}' already registered", name);
        }
        Ok(inserted > 0)
    }

    /// Number of entries whose doctor is exactly `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn doctor_usage(&self, name: &str) -> Result<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM camp_entries WHERE doctor = ?1",
            [name],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Whether any recorded entry names this doctor.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn is_doctor_used(&self, name: &str) -> Result<bool> {
        Ok(self.doctor_usage(name)? > 0)
    }

    /// Remove a doctor from the registry, trimming the name the same way
    /// [`Storage::add_doctor`] does.
    ///
    /// Returns `true` if a row was removed; deleting an unknown name is a
    /// no-op returning `false`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReferentialConflict`] if any entry still names the
    /// doctor, or a storage error if the delete fails.
    pub fn delete_doctor(&self, name: &str) -> Result<bool> {
        let name = name.trim();
        let entries = self.doctor_usage(name)?;
        if entries > 0 {
            return Err(Error::referential_conflict(name, entries));
        }

        let affected = self
            .conn
            .execute("DELETE FROM doctors WHERE name = ?1", [name])?;
        if affected > 0 {
            info!("Deleted doctor '{}'", name);
        }
        Ok(affected > 0)
    }

    /// Check that a form's selected doctor is in the registry.
    ///
    /// A form with no doctor selected passes; [`EntryForm::validate`]
    /// reports that case.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownDoctor`] if the selected name is not
    /// registered, or a storage error if the lookup fails.
    pub fn ensure_registered_doctor(&self, form: &EntryForm) -> Result<()> {
        let Some(doctor) = form.selected_doctor() else {
            return Ok(());
        };
        let registered: bool = self.conn.query_row(
            "SELECT EXISTS (SELECT 1 FROM doctors WHERE name = ?1)",
            [doctor],
            |row| row.get(0),
        )?;
        if registered {
            Ok(())
        } else {
            Err(ValidationError::UnknownDoctor(doctor.to_string()).into())
        }
    }
}

/// Selection-list values: the placeholder followed by the registered names.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn doctor_choices(storage: &Storage) -> Result<Vec<String>> {
    let mut choices = vec![DOCTOR_PLACEHOLDER.to_string()];
    choices.extend(storage.list_doctors()?);
    Ok(choices)
}
