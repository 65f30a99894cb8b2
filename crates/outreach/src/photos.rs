//! Photo store.
//!
//! Uploaded camp photos live as plain files in one directory, named
//! `<YYYYmmdd_HHMMSS>_<original name>` with whitespace in the original name
//! replaced by underscores. Entries reference photos by that stored name.
//!
//! Two uploads with the same original name in the same second would share a
//! name. When that happens and the bytes differ, the later upload gets a short
//! BLAKE3 content hash inserted after the timestamp so neither file is lost;
//! identical bytes reuse the existing file.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Timestamp prefix format for stored photo names.
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Hex digits of the content hash used to disambiguate collisions.
const HASH_PREFIX_LEN: usize = 8;

/// Fallback when the original name has nothing usable in it.
const FALLBACK_NAME: &str = "photo";

/// A photo supplied with a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoUpload {
    /// Raw image bytes.
    pub bytes: Vec<u8>,
    /// File name as the operator's device reported it.
    pub original_name: String,
}

impl PhotoUpload {
    /// Create an upload from bytes and the original file name.
    #[must_use]
    pub fn new(bytes: Vec<u8>, original_name: impl Into<String>) -> Self {
        Self {
            bytes,
            original_name: original_name.into(),
        }
    }

    /// Read an upload from a local file, keeping its file name.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let original_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(bytes, original_name))
    }
}

/// Directory of stored photos.
#[derive(Debug, Clone)]
pub struct PhotoStore {
    dir: PathBuf,
}

impl PhotoStore {
    /// A store rooted at `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The content directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Store a photo captured now and return its stored name.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file cannot
    /// be written.
    pub fn store(&self, upload: &PhotoUpload) -> Result<String> {
        self.store_at(upload, Local::now().naive_local())
    }

    /// Store a photo under a name derived from `captured_at`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file cannot
    /// be written.
    pub fn store_at(&self, upload: &PhotoUpload, captured_at: NaiveDateTime) -> Result<String> {
        std::fs::create_dir_all(&self.dir).map_err(|source| Error::DirectoryCreate {
            path: self.dir.clone(),
            source,
        })?;

        let timestamp = captured_at.format(TIMESTAMP_FORMAT);
        let sanitized = sanitize_file_name(&upload.original_name);
        let mut name = format!("{timestamp}_{sanitized}");

        if let Some(existing) = self.read(&name)? {
            let digest = blake3::hash(&upload.bytes);
            if blake3::hash(&existing) == digest {
                debug!("Photo {} already stored with identical content", name);
                return Ok(name);
            }
            let hex = digest.to_hex();
            name = format!("{timestamp}_{}_{sanitized}", &hex[..HASH_PREFIX_LEN]);
            warn!("Photo name collision, storing as {}", name);
        }

        let path = self.dir.join(&name);
        std::fs::write(&path, &upload.bytes).map_err(|source| Error::PhotoWrite {
            path: path.clone(),
            source,
        })?;

        info!("Stored photo {} ({} bytes)", name, upload.bytes.len());
        Ok(name)
    }

    /// Path a stored name resolves to.
    #[must_use]
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Read a stored photo. Returns `None` if it isn't on disk.
    ///
    /// Names that would resolve outside the content directory are treated as
    /// missing.
    ///
    /// # Errors
    ///
    /// Returns an error for I/O failures other than a missing file.
    pub fn read(&self, name: &str) -> Result<Option<Vec<u8>>> {
        if !is_plain_file_name(name) {
            warn!("Ignoring photo name outside the photo directory: {}", name);
            return Ok(None);
        }

        match std::fs::read(self.path_for(name)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Reduce an uploaded file name to its final path component with whitespace
/// replaced by underscores.
#[must_use]
pub fn sanitize_file_name(original: &str) -> String {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    let sanitized: String = base
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();

    if sanitized.is_empty() || sanitized == "." || sanitized == ".." {
        FALLBACK_NAME.to_string()
    } else {
        sanitized
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn captured() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 14)
            .unwrap()
            .and_hms_opt(10, 30, 5)
            .unwrap()
    }

    #[test]
    fn test_sanitize_replaces_whitespace() {
        assert_eq!(sanitize_file_name("camp photo 1.jpg"), "camp_photo_1.jpg");
        assert_eq!(sanitize_file_name("tab\there.png"), "tab_here.png");
    }

    #[test]
    fn test_sanitize_strips_directories() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name(r"C:\Users\me\pic.jpg"), "pic.jpg");
        assert_eq!(sanitize_file_name("dir/"), "photo");
        assert_eq!(sanitize_file_name(""), "photo");
    }

    #[test]
    fn test_store_names_with_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let store = PhotoStore::new(dir.path().join("uploaded_images"));
        let upload = PhotoUpload::new(b"jpeg bytes".to_vec(), "camp photo.jpg");

        let name = store.store_at(&upload, captured()).unwrap();
        assert_eq!(name, "20240314_103005_camp_photo.jpg");
        assert_eq!(
            std::fs::read(store.path_for(&name)).unwrap(),
            b"jpeg bytes"
        );
    }

    #[test]
    fn test_store_identical_upload_reuses_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = PhotoStore::new(dir.path());
        let upload = PhotoUpload::new(b"same".to_vec(), "a.jpg");

        let first = store.store_at(&upload, captured()).unwrap();
        let second = store.store_at(&upload, captured()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_store_collision_keeps_both() {
        let dir = tempfile::tempdir().unwrap();
        let store = PhotoStore::new(dir.path());

        let first = store
            .store_at(&PhotoUpload::new(b"one".to_vec(), "a.jpg"), captured())
            .unwrap();
        let second = store
            .store_at(&PhotoUpload::new(b"two".to_vec(), "a.jpg"), captured())
            .unwrap();

        assert_ne!(first, second);
        assert!(second.starts_with("20240314_103005_"));
        assert!(second.ends_with("_a.jpg"));
        assert_eq!(store.read(&first).unwrap().unwrap(), b"one");
        assert_eq!(store.read(&second).unwrap().unwrap(), b"two");
    }

    #[test]
    fn test_read_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = PhotoStore::new(dir.path());
        assert!(store.read("nope.jpg").unwrap().is_none());
    }

    #[test]
    fn test_read_rejects_escaping_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = PhotoStore::new(dir.path().join("photos"));
        std::fs::write(dir.path().join("secret.txt"), b"x").unwrap();

        assert!(store.read("../secret.txt").unwrap().is_none());
        assert!(store.read("..").unwrap().is_none());
    }

    #[test]
    fn test_store_fails_when_dir_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"file").unwrap();

        let store = PhotoStore::new(&blocker);
        let err = store
            .store_at(&PhotoUpload::new(b"x".to_vec(), "a.jpg"), captured())
            .unwrap_err();
        assert!(err.is_storage_failure());
    }

    #[test]
    fn test_upload_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("my pic.png");
        std::fs::write(&path, b"png").unwrap();

        let upload = PhotoUpload::from_path(&path).unwrap();
        assert_eq!(upload.original_name, "my pic.png");
        assert_eq!(upload.bytes, b"png");
    }
}
