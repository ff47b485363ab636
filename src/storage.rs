//! Persistent key-value slots backing the template store.
use std::{
    cell::RefCell,
    collections::HashMap,
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    rc::Rc,
};

use log::{debug, error, trace};
use tempfile::NamedTempFile;

use crate::{Result, TmplError};

/// A string-valued key-value store, the moral equivalent of a browser's local storage.
pub trait KeyValueStorage {
    /// Returns the value stored under `key`, or `None` if the key was never written.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn item_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let path = self.item_path(key);
        trace!("Reading storage item from {}", path.display());

        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No storage item at {}", path.display());
                Ok(None)
            }
            Err(e) => {
                error!("Failed to read storage item {}: {}", path.display(), e);
                Err(TmplError::Io(e))
            }
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        if !self.dir.exists() {
            debug!("Creating storage directory: {}", self.dir.display());
            fs::create_dir_all(&self.dir).map_err(|e| {
                error!("Failed to create storage directory: {}", e);
                TmplError::DirectoryError {
                    path: self.dir.clone(),
                }
            })?;
        }

        // Write next to the target, then atomically move into place
        let path = self.item_path(key);
        let mut temp_file = NamedTempFile::new_in(&self.dir).map_err(|e| {
            error!("Failed to create temporary file: {}", e);
            TmplError::Io(e)
        })?;

        temp_file.write_all(value.as_bytes())?;
        temp_file.flush()?;

        temp_file.persist(&path).map_err(|e| {
            error!("Failed to persist file {}: {}", path.display(), e.error);
            TmplError::Io(e.error)
        })?;

        trace!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }
}

/// In-memory storage. Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-populated with a single item
    pub fn with_item(key: &str, value: &str) -> Self {
        let storage = Self::new();
        storage
            .items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        storage
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_storage_missing_key_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        assert_eq!(storage.get_item("messageTemplates").unwrap(), None);
    }

    #[test]
    fn file_storage_creates_directory_and_replaces_value() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested").join("data"));

        storage.set_item("k", "[1]").unwrap();
        storage.set_item("k", "[2]").unwrap();

        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("[2]"));
        assert!(storage.dir().join("k.json").is_file());
    }

    #[test]
    fn file_storage_write_fails_when_dir_is_a_file() {
        let file = NamedTempFile::new().unwrap();
        let storage = FileStorage::new(file.path());
        assert!(storage.set_item("k", "[]").is_err());
    }

    #[test]
    fn memory_storage_clones_share_items() {
        let storage = MemoryStorage::new();
        let other = storage.clone();
        storage.set_item("k", "v").unwrap();
        assert_eq!(other.get_item("k").unwrap().as_deref(), Some("v"));
    }
}
