//! Key-value storage
//!
//! A synchronous string key-value store, modelled on browser local storage:
//! reads are infallible, writes are durable, and unreadable persisted data is
//! recovered as empty rather than surfaced to the caller.

use std::{fmt, fs, io, path::PathBuf};

use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::warn;

/// Errors raised by durable writes.
///
/// Reads never error: missing or corrupt data is treated as absent.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing file could not be written.
    #[error("failed to write storage file: {0}")]
    Io(#[from] io::Error),

    /// The entries could not be encoded for writing.
    #[error("failed to encode storage entries: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A synchronous string key-value store.
pub trait KeyValueStore: fmt::Debug {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Durably write `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the value could not be made durable.
    fn put(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove the value stored under `key`, if present.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the removal could not be made durable.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-memory store for tests and demos.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: FxHashMap<String, String>,
}

impl MemoryStore {
    /// Create an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// File-backed store holding all entries in a single JSON object.
///
/// Every operation reads and rewrites the whole file, so several handles
/// opened on the same path stay consistent within a single-threaded session.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Open a store backed by the file at `path`.
    ///
    /// The file does not need to exist yet; it is created on first write. An
    /// existing but unreadable file is recovered as empty on access.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_entries(&self) -> FxHashMap<String, String> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return FxHashMap::default(),
            Err(err) => {
                warn!(path = %self.path.display(), %err, "storage file unreadable; starting empty");
                return FxHashMap::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(path = %self.path.display(), %err, "storage file corrupt; starting empty");
                FxHashMap::default()
            }
        }
    }

    fn write_entries(&self, entries: &FxHashMap<String, String>) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(entries)?;
        fs::write(&self.path, encoded)?;

        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.read_entries().remove(key)
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.read_entries();
        entries.insert(key.to_owned(), value.to_owned());

        self.write_entries(&entries)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.read_entries();

        if entries.remove(key).is_some() {
            self.write_entries(&entries)?;
        }

        Ok(())
    }
}
