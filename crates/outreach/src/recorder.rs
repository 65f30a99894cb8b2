//! Entry recorder: validate a form, store its photo, insert the row.
//!
//! Validation runs before anything touches disk, so a rejected form leaves
//! no trace. The photo is written before the row so a stored entry never
//! references a missing file. If the insert then fails, the photo stays on
//! disk unreferenced; it is logged and not cleaned up.

use chrono::{DateTime, Local, SecondsFormat};
use serde::Serialize;
use tracing::{info, warn};

use crate::entry::{EntryForm, EntryId, SubmissionSummary};
use crate::error::Result;
use crate::photos::{PhotoStore, PhotoUpload};
use crate::storage::Storage;

/// Outcome of a successful submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Receipt {
    /// Identity of the new row.
    pub id: EntryId,
    /// Preview of what was saved.
    pub summary: SubmissionSummary,
}

/// Records camp entries into storage.
#[derive(Debug)]
pub struct Recorder<'a> {
    storage: &'a Storage,
    photos: &'a PhotoStore,
}

impl<'a> Recorder<'a> {
    /// Create a recorder over a storage handle and photo store.
    #[must_use]
    pub fn new(storage: &'a Storage, photos: &'a PhotoStore) -> Self {
        Self { storage, photos }
    }

    /// Submit a form captured now.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the form breaks a rule, or a storage
    /// error if the photo or row cannot be written.
    pub fn submit(&self, form: &EntryForm, photo: Option<&PhotoUpload>) -> Result<Receipt> {
        self.submit_at(form, photo, Local::now())
    }

    /// Submit a form with an explicit capture time.
    ///
    /// # Errors
    ///
    /// Same as [`Recorder::submit`].
    pub fn submit_at(
        &self,
        form: &EntryForm,
        photo: Option<&PhotoUpload>,
        captured_at: DateTime<Local>,
    ) -> Result<Receipt> {
        let entry = form.validate()?;

        let photo_name = photo
            .map(|upload| self.photos.store_at(upload, captured_at.naive_local()))
            .transpose()?;

        let created_at = captured_at.to_rfc3339_opts(SecondsFormat::Micros, false);
        let id = match self
            .storage
            .insert_entry(&entry, photo_name.as_deref(), &created_at)
        {
            Ok(id) => id,
            Err(e) => {
                if let Some(name) = &photo_name {
                    warn!("Entry not saved; photo {} left unreferenced", name);
                }
                return Err(e);
            }
        };

        info!(
            "Recorded entry {} for {} on {}",
            id,
            entry.place(),
            entry.camp_date()
        );
        Ok(Receipt {
            id,
            summary: SubmissionSummary::new(&entry, photo_name),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::tests::riverside_form;
    use crate::entry::{Counts, Geolocation};
    use crate::error::{Error, ValidationError};
    use chrono::TimeZone;

    struct Fixture {
        _dir: tempfile::TempDir,
        storage: Storage,
        photos: PhotoStore,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let photos = PhotoStore::new(dir.path().join("uploaded_images"));
        Fixture {
            storage: Storage::open_in_memory().unwrap(),
            photos,
            _dir: dir,
        }
    }

    fn captured() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 14, 10, 30, 0).unwrap()
    }

    #[test]
    fn test_submit_riverside() {
        let fx = fixture();
        let recorder = Recorder::new(&fx.storage, &fx.photos);

        let receipt = recorder
            .submit_at(&riverside_form(), None, captured())
            .unwrap();
        let stored = fx.storage.get_entry(receipt.id).unwrap().unwrap();

        assert_eq!(stored.opd_t, 25);
        assert_eq!(stored.surg_t, 6);
        assert_eq!(stored.hosp_t, 4);
        assert!(stored.created_at.starts_with("2024-03-14T10:30:00"));
        assert_eq!(receipt.summary.place, "Riverside");
        assert!(receipt.summary.photo.is_none());
    }

    #[test]
    fn test_rejected_submission_writes_nothing() {
        let fx = fixture();
        let recorder = Recorder::new(&fx.storage, &fx.photos);
        let mut form = riverside_form();
        form.hospital = Counts::new(3, 5);
        let photo = PhotoUpload::new(b"img".to_vec(), "camp.jpg");

        let err = recorder
            .submit_at(&form, Some(&photo), captured())
            .unwrap_err();

        assert_eq!(
            err.validation(),
            Some(&ValidationError::HospitalExceedsSurgery {
                hospital: 8,
                surgery: 6
            })
        );
        assert_eq!(fx.storage.count_entries().unwrap(), 0);
        assert!(!fx.photos.dir().exists());
    }

    #[test]
    fn test_submit_with_photo_and_location() {
        let fx = fixture();
        let recorder = Recorder::new(&fx.storage, &fx.photos);
        let mut form = riverside_form();
        form.location = Some(Geolocation {
            latitude: 12.5,
            longitude: 77.25,
            accuracy: 8.0,
        });
        let photo = PhotoUpload::new(b"img".to_vec(), "camp group.jpg");

        let receipt = recorder
            .submit_at(&form, Some(&photo), captured())
            .unwrap();

        let name = receipt.summary.photo.clone().unwrap();
        assert_eq!(name, "20240314_103000_camp_group.jpg");
        assert_eq!(fx.photos.read(&name).unwrap().unwrap(), b"img");

        let stored = fx.storage.get_entry(receipt.id).unwrap().unwrap();
        assert_eq!(stored.photo_name.as_deref(), Some(name.as_str()));
        assert_eq!(stored.location(), form.location);
        assert_eq!(receipt.summary.latitude, Some(12.5));
    }

    #[test]
    fn test_photo_failure_aborts_insert() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"file").unwrap();
        let storage = Storage::open_in_memory().unwrap();
        let photos = PhotoStore::new(&blocker);
        let recorder = Recorder::new(&storage, &photos);

        let photo = PhotoUpload::new(b"img".to_vec(), "a.jpg");
        let err = recorder
            .submit_at(&riverside_form(), Some(&photo), captured())
            .unwrap_err();

        assert!(matches!(err, Error::DirectoryCreate { .. }));
        assert_eq!(storage.count_entries().unwrap(), 0);
    }

    #[test]
    fn test_failed_insert_keeps_photo_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("outreach.db");
        let storage = Storage::open(&db_path).unwrap();
        rusqlite::Connection::open(&db_path)
            .unwrap()
            .execute_batch(
                "CREATE TRIGGER refuse_entries BEFORE INSERT ON camp_entries \
                 BEGIN SELECT RAISE(ABORT, 'entries are frozen'); END;",
            )
            .unwrap();
        let photos = PhotoStore::new(dir.path().join("uploaded_images"));
        let recorder = Recorder::new(&storage, &photos);

        let photo = PhotoUpload::new(b"img".to_vec(), "camp.jpg");
        let err = recorder
            .submit_at(&riverside_form(), Some(&photo), captured())
            .unwrap_err();

        assert!(err.is_storage_failure());
        assert_eq!(storage.count_entries().unwrap(), 0);
        assert_eq!(
            photos.read("20240314_103000_camp.jpg").unwrap().as_deref(),
            Some(&b"img"[..])
        );
    }

    #[test]
    fn test_large_counts_stored_exactly_or_rejected() {
        let fx = fixture();
        let recorder = Recorder::new(&fx.storage, &fx.photos);

        let mut form = riverside_form();
        form.opd = Counts::new(u32::MAX, 5);
        form.surgery = Counts::new(u32::MAX, 0);
        form.hospital = Counts::new(u32::MAX, 1);
        let err = recorder.submit_at(&form, None, captured()).unwrap_err();
        assert!(matches!(
            err.validation(),
            Some(ValidationError::HospitalExceedsSurgery { .. })
        ));
        assert_eq!(fx.storage.count_entries().unwrap(), 0);

        form.hospital = Counts::new(u32::MAX, 0);
        let receipt = recorder.submit_at(&form, None, captured()).unwrap();
        let stored = fx.storage.get_entry(receipt.id).unwrap().unwrap();
        assert_eq!(stored.opd_t, 4_294_967_300);
        assert_eq!(stored.surg_t, stored.hosp_t);
    }

    #[test]
    fn test_each_submit_appends() {
        let fx = fixture();
        let recorder = Recorder::new(&fx.storage, &fx.photos);

        let first = recorder.submit(&riverside_form(), None).unwrap();
        let second = recorder.submit(&riverside_form(), None).unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(fx.storage.count_entries().unwrap(), 2);
    }
}
