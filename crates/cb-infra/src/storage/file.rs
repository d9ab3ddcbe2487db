use std::fs;
use std::io;
use std::path::PathBuf;

use cb_core::ports::{KeyValueStoragePort, StorageError};
use tracing::debug;

/// File-backed key-value storage: one `<key>.json` file per key.
///
/// Writes go to a temp file that is renamed over the target, so a reader
/// sees either the old or the new value.
#[derive(Clone)]
pub struct FileKeyValueStorage {
    base_dir: PathBuf,
}

impl FileKeyValueStorage {
    /// Create storage rooted at `base_dir`, creating the directory.
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self, io::Error> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    /// Construct without touching the filesystem.
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    fn file_path(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.base_dir.join(format!("{safe}.json"))
    }

    fn map_io_error(context: &str, err: io::Error) -> StorageError {
        match err.kind() {
            io::ErrorKind::PermissionDenied | io::ErrorKind::NotFound => {
                StorageError::Unavailable(format!("{context}: {err}"))
            }
            _ => StorageError::Other(format!("{context}: {err}")),
        }
    }
}

impl KeyValueStoragePort for FileKeyValueStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.file_path(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(Self::map_io_error("failed to read storage file", err)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.file_path(key);
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, value)
            .map_err(|err| Self::map_io_error("failed to write storage temp file", err))?;
        fs::rename(&temp_path, &path)
            .map_err(|err| Self::map_io_error("failed to rename storage file", err))?;
        debug!(path = %path.display(), bytes = value.len(), "storage file written");
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = self.file_path(key);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "storage file deleted");
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(Self::map_io_error("failed to delete storage file", err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_stores_and_loads() {
        let temp_dir = tempfile::TempDir::new().expect("temp dir");
        let storage = FileKeyValueStorage::new(temp_dir.path()).expect("storage");
        storage
            .set("clipper_bookmarks", r#"{"schema_version":1,"ids":[]}"#)
            .expect("set");
        let loaded = storage.get("clipper_bookmarks").expect("get");
        assert_eq!(loaded.as_deref(), Some(r#"{"schema_version":1,"ids":[]}"#));
        assert!(temp_dir.path().join("clipper_bookmarks.json").exists());
    }

    #[test]
    fn missing_key_returns_none() {
        let temp_dir = tempfile::TempDir::new().expect("temp dir");
        let storage = FileKeyValueStorage::with_base_dir(temp_dir.path().to_path_buf());
        assert!(storage.get("clipper_bookmarks").expect("get").is_none());
    }

    #[test]
    fn delete_is_idempotent() {
        let temp_dir = tempfile::TempDir::new().expect("temp dir");
        let storage = FileKeyValueStorage::new(temp_dir.path()).expect("storage");
        storage.set("k", "v").expect("set");
        storage.delete("k").expect("delete");
        storage.delete("k").expect("second delete");
        assert!(storage.get("k").expect("get").is_none());
    }

    #[test]
    fn unsafe_key_characters_stay_inside_base_dir() {
        let temp_dir = tempfile::TempDir::new().expect("temp dir");
        let storage = FileKeyValueStorage::new(temp_dir.path()).expect("storage");
        storage.set("../escape", "v").expect("set");
        assert!(temp_dir.path().join("___escape.json").exists());
    }

    #[test]
    fn missing_base_dir_reports_unavailable_on_write() {
        let temp_dir = tempfile::TempDir::new().expect("temp dir");
        let storage = FileKeyValueStorage::with_base_dir(temp_dir.path().join("gone"));
        let err = storage.set("k", "v").unwrap_err();
        assert!(matches!(err, StorageError::Unavailable(_)));
    }
}
