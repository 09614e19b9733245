//! The key-value persistence boundary.

use std::cell::RefCell;
use std::collections::HashMap;
use std::error::Error;

use thiserror::Error;

/// Failure surfaced by a storage provider.
///
/// There is deliberately no wider taxonomy: the tracker performs no retries
/// and passes provider failures through unmodified.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading a key failed.
    #[error("failed to read key {key}")]
    Read {
        key: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// Writing a key failed.
    #[error("failed to write key {key}")]
    Write {
        key: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

impl StorageError {
    pub fn read(key: impl Into<String>, source: impl Error + Send + Sync + 'static) -> Self {
        Self::Read {
            key: key.into(),
            source: Box::new(source),
        }
    }

    pub fn write(key: impl Into<String>, source: impl Error + Send + Sync + 'static) -> Self {
        Self::Write {
            key: key.into(),
            source: Box::new(source),
        }
    }
}

/// The key-value persistence capability used to survive across activations.
///
/// A key is the sole identity of an entry: providers sharing a key share
/// state, and concurrent writers are last-write-wins. No transactional
/// guarantees are assumed.
pub trait StorageProvider {
    /// Returns the stored value for `key`, or `None` if absent.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous entry.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-process store.
///
/// The default provider when no persistent one has been installed, and the
/// usual test double. Never fails.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageProvider for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}
