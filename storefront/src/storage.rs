//! Key/value slots holding client-side state.
//!
//! Every slot stores a single JSON string. Writes replace the whole slot, so
//! the last write wins.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

/// Errors from a key/value backend
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem access failed
    #[error("Storage I/O failed for {key}: {source}")]
    Io {
        /// Slot being accessed
        key: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Value could not be encoded
    #[error("Failed to encode {key}: {message}")]
    Encode {
        /// Slot being written
        key: String,
        /// Encoder message
        message: String,
    },

    /// Slot name cannot be mapped to the backend
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

/// A durable client-side key/value store
pub trait KeyValueStore: Send + Sync {
    /// Read a slot; `Ok(None)` when it has never been written
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace a slot
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a slot; deleting a missing slot succeeds
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory store for tests and demos
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with one slot already written
    #[must_use]
    pub fn with_slot(key: &str, value: &str) -> Self {
        let store = Self::new();
        store
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(slots.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.remove(key);
        Ok(())
    }
}

/// Directory-backed store: one `<key>.json` file per slot
///
/// Writes go to a temporary file that is renamed over the slot, so a reader
/// never sees a half-written value.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Use `dir` as the slot directory; it is created on first write
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the slot files
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.slot_path(key)?;
        match std::fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.slot_path(key)?;
        let io_error = |source| StorageError::Io {
            key: key.to_string(),
            source,
        };

        std::fs::create_dir_all(&self.dir).map_err(io_error)?;
        let staging = path.with_extension("json.tmp");
        std::fs::write(&staging, value).map_err(io_error)?;
        std::fs::rename(&staging, &path).map_err(io_error)?;

        tracing::trace!(key, path = %path.display(), "slot written");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.slot_path(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }
}
