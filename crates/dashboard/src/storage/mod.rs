//! Durable per-device key-value storage.
//!
//! The token store persists its state through [`KeyValueStorage`], the
//! equivalent of a browser's local storage. Two backends are provided:
//!
//! - [`FileStorage`] - a JSON file, durable across process restarts
//! - [`MemoryStorage`] - process-lifetime storage, mainly for tests

pub mod file;
pub mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use thiserror::Error;

/// Errors that can occur when reading or writing storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file is not a JSON object of strings.
    #[error("storage file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// A previous writer panicked while holding the storage lock.
    #[error("storage lock poisoned")]
    Poisoned,
}

/// String key-value storage scoped to one device/profile.
///
/// Absent keys read as `None`. Implementations must be safe to share
/// between tasks.
pub trait KeyValueStorage: Send + Sync {
    /// Read a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a value. Removing an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
