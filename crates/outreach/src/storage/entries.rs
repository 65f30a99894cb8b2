//! Camp entry persistence. Rows are inserted and read, never updated or
//! deleted.

use rusqlite::{params, OptionalExtension, Row};
use tracing::{debug, warn};

use super::schema::ENTRY_COLUMNS;
use super::Storage;
use crate::entry::{CampEntry, EntryId, ValidatedEntry};
use crate::error::Result;

impl Storage {
    /// Insert one validated entry.
    ///
    /// `photo_name` must already exist in the photo store; `created_at` is the
    /// capture timestamp.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn insert_entry(
        &self,
        entry: &ValidatedEntry,
        photo_name: Option<&str>,
        created_at: &str,
    ) -> Result<EntryId> {
        let (opd_t, surg_t, hosp_t) = entry.totals();
        let location = entry.location;

        self.conn.execute(
            r"
            INSERT INTO camp_entries (
                place, camp_date, administrator, doctor, optom, optom_intern,
                opd_m, opd_f, opd_t, surg_m, surg_f, surg_t, hosp_m, hosp_f, hosp_t,
                ciplox, ciplox_d, cmc, fedtive, glucose_strips, spectacles,
                photo_name, latitude, longitude, accuracy, created_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6,
                ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                ?16, ?17, ?18, ?19, ?20, ?21,
                ?22, ?23, ?24, ?25, ?26
            )
            ",
            params![
                entry.place,
                entry.camp_date.to_string(),
                entry.administrator,
                entry.doctor,
                entry.optom,
                entry.optom_intern,
                entry.opd.male,
                entry.opd.female,
                opd_t,
                entry.surgery.male,
                entry.surgery.female,
                surg_t,
                entry.hospital.male,
                entry.hospital.female,
                hosp_t,
                entry.medicines.ciplox,
                entry.medicines.ciplox_d,
                entry.medicines.cmc,
                entry.medicines.fedtive,
                entry.medicines.glucose_strips,
                entry.spectacles,
                photo_name,
                location.map(|l| l.latitude),
                location.map(|l| l.longitude),
                location.map(|l| l.accuracy),
                created_at,
            ],
        )?;

        let id = EntryId(self.conn.last_insert_rowid());
        debug!("Inserted camp entry with id {}", id);
        Ok(id)
    }

    /// Get an entry by its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_entry(&self, id: EntryId) -> Result<Option<CampEntry>> {
        let sql = format!(
            "SELECT {} FROM camp_entries WHERE id = ?1",
            ENTRY_COLUMNS.join(", ")
        );
        let entry = self
            .conn
            .query_row(&sql, [id.0], row_to_entry)
            .optional()?;
        Ok(entry)
    }

    /// Every entry, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn all_entries(&self) -> Result<Vec<CampEntry>> {
        let sql = format!(
            "SELECT {} FROM camp_entries ORDER BY id",
            ENTRY_COLUMNS.join(", ")
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let entries = stmt
            .query_map([], row_to_entry)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Count recorded entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count_entries(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM camp_entries", [], |row| row.get(0))?;
        Ok(count)
    }
}

/// Convert a row selected with [`ENTRY_COLUMNS`] into a [`CampEntry`].
fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<CampEntry> {
    let text = |idx: usize| -> rusqlite::Result<String> {
        Ok(row.get::<_, Option<String>>(idx)?.unwrap_or_default())
    };
    let count = |idx: usize| -> rusqlite::Result<u32> {
        Ok(row.get::<_, Option<u32>>(idx)?.unwrap_or_default())
    };
    let total = |idx: usize| -> rusqlite::Result<i64> {
        Ok(row.get::<_, Option<i64>>(idx)?.unwrap_or_default())
    };

    let entry = CampEntry {
        id: EntryId(row.get(0)?),
        place: text(1)?,
        camp_date: text(2)?,
        administrator: text(3)?,
        doctor: text(4)?,
        optom: text(5)?,
        optom_intern: text(6)?,
        opd_m: count(7)?,
        opd_f: count(8)?,
        opd_t: total(9)?,
        surg_m: count(10)?,
        surg_f: count(11)?,
        surg_t: total(12)?,
        hosp_m: count(13)?,
        hosp_f: count(14)?,
        hosp_t: total(15)?,
        ciplox: count(16)?,
        ciplox_d: count(17)?,
        cmc: count(18)?,
        fedtive: count(19)?,
        glucose_strips: count(20)?,
        spectacles: count(21)?,
        photo_name: row.get(22)?,
        latitude: row.get(23)?,
        longitude: row.get(24)?,
        accuracy: row.get(25)?,
        created_at: text(26)?,
    };

    let parts = [entry.latitude, entry.longitude, entry.accuracy];
    if parts.iter().any(Option::is_some) && entry.location().is_none() {
        warn!("Entry {} has a partial location", entry.id);
    }

    Ok(entry)
}
