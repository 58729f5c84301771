//! File-backed key/value storage
//!
//! Keeps every item in one JSON object on disk. Writes go to a temporary file
//! in the same directory and are renamed over the target, so a crash never
//! leaves a half-written store behind.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use pkce_auth_common::auth::KeyValueStorage;
use pkce_auth_domain::{AuthError, Result};
use tempfile::NamedTempFile;

type Items = BTreeMap<String, String>;

/// Persistent [`KeyValueStorage`] backed by a JSON file
///
/// A missing file reads as an empty store. A file that cannot be parsed is
/// logged and also treated as empty; the next write replaces it.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Items> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Items::new()),
            Err(e) => {
                return Err(AuthError::Storage(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        match serde_json::from_str(&contents) {
            Ok(items) => Ok(items),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Storage file is corrupt, treating as empty"
                );
                Ok(Items::new())
            }
        }
    }

    fn save(&self, items: &Items) -> Result<()> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&parent).map_err(|e| {
            AuthError::Storage(format!("Failed to create {}: {}", parent.display(), e))
        })?;

        let json = serde_json::to_vec_pretty(items)
            .map_err(|e| AuthError::Storage(format!("Failed to serialize store: {}", e)))?;

        let mut temp = NamedTempFile::new_in(&parent)
            .map_err(|e| AuthError::Storage(format!("Failed to create temp file: {}", e)))?;
        temp.write_all(&json)
            .and_then(|()| temp.as_file().sync_all())
            .map_err(|e| AuthError::Storage(format!("Failed to write temp file: {}", e)))?;

        // Atomic rename
        temp.persist(&self.path).map_err(|e| {
            AuthError::Storage(format!("Failed to replace {}: {}", self.path.display(), e.error))
        })?;

        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock();
        Ok(self.load()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.lock();
        let mut items = self.load()?;
        items.insert(key.to_string(), value.to_string());
        self.save(&items)?;
        tracing::debug!(key, path = %self.path.display(), "Stored item");
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let _guard = self.lock.lock();
        let mut items = self.load()?;
        if items.remove(key).is_some() {
            self.save(&items)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for storage::file.
    use super::*;

    /// Validates `FileStorage::get_item` behavior for the missing file
    /// scenario.
    ///
    /// Assertions:
    /// - Reads return `None`
    /// - Removing an absent key does not create the file
    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("auth.json"));

        assert_eq!(storage.get_item("auth").unwrap(), None);
        storage.remove_item("auth").unwrap();
        assert!(!storage.path().exists());
    }

    /// Validates `FileStorage::set_item` behavior for the nested directory
    /// scenario.
    #[test]
    fn test_set_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("nested").join("auth.json");
        let storage = FileStorage::new(&path);

        storage.set_item("auth", "{\"a\":1}").unwrap();
        storage.set_item("other", "x").unwrap();

        assert!(path.exists());
        assert_eq!(storage.get_item("auth").unwrap().as_deref(), Some("{\"a\":1}"));
        assert_eq!(storage.get_item("other").unwrap().as_deref(), Some("x"));
    }

    /// Validates `FileStorage` behavior for the reopen scenario.
    ///
    /// Assertions:
    /// - A second instance over the same path sees earlier writes
    /// - Removal is persisted
    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth.json");

        FileStorage::new(&path).set_item("auth", "cached").unwrap();
        let reopened = FileStorage::new(&path);
        assert_eq!(reopened.get_item("auth").unwrap().as_deref(), Some("cached"));

        reopened.remove_item("auth").unwrap();
        assert_eq!(FileStorage::new(&path).get_item("auth").unwrap(), None);
    }

    /// Validates `FileStorage::get_item` behavior for the corrupt file
    /// scenario.
    #[test]
    fn test_corrupt_file_reads_empty_and_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth.json");
        std::fs::write(&path, "{not json").unwrap();
        let storage = FileStorage::new(&path);

        assert_eq!(storage.get_item("auth").unwrap(), None);

        storage.set_item("auth", "fresh").unwrap();
        let on_disk: Items = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk.get("auth").map(String::as_str), Some("fresh"));
    }

    /// Validates `FileStorage::get_item` behavior when the path is a
    /// directory.
    #[test]
    fn test_unreadable_path_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());

        assert!(matches!(storage.get_item("auth"), Err(AuthError::Storage(_))));
    }
}
