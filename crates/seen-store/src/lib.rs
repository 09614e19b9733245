//! Persistent storage provider for the visibility tracker.
//!
//! A single-table SQLite key-value store, the durable stand-in for a
//! browser's `localStorage`. Values are opaque strings; the tracker writes
//! exactly one ISO-8601 timestamp entry per storage key.
//!
//! # Thread Safety
//!
//! [`FileStore`] wraps a `rusqlite::Connection`, which is `Send` but not
//! `Sync`. The tracker itself is single-threaded, so a store instance is
//! meant to live on the thread that drives the binding.

use std::fmt;
use std::path::Path;

use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;

use seen_core::{StorageError, StorageProvider};

/// Errors opening or initializing a store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// SQLite-backed key-value store.
pub struct FileStore {
    conn: Connection,
}

impl FileStore {
    /// Opens a store at the given path, creating it if necessary.
    ///
    /// The schema is initialized on first open.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init()?;
        tracing::debug!(path = %path.display(), "opened file store");
        Ok(store)
    }

    /// Opens an in-memory store.
    ///
    /// Useful for testing. The contents are destroyed when the connection
    /// closes.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init()?;
        Ok(store)
    }

    /// Initializes the schema. Idempotent.
    fn init(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            ",
        )?;
        Ok(())
    }
}

impl fmt::Debug for FileStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileStore").finish_non_exhaustive()
    }
}

impl StorageProvider for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(|error| StorageError::read(key, error))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn
            .execute(
                "INSERT INTO kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .map(|_| ())
            .map_err(|error| StorageError::write(key, error))
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    use seen_core::{Config, Document, FixedClock, VisibilityState, activate};

    use super::*;

    #[test]
    fn absent_key_reads_as_none() {
        let store = FileStore::open_in_memory().unwrap();
        assert_eq!(store.get_item("missing").unwrap(), None);
    }

    #[test]
    fn set_then_get_round_trips() {
        let store = FileStore::open_in_memory().unwrap();
        store.set_item("k", "2023-01-01T00:00:00.000Z").unwrap();
        assert_eq!(
            store.get_item("k").unwrap().as_deref(),
            Some("2023-01-01T00:00:00.000Z")
        );
    }

    #[test]
    fn set_replaces_previous_entry() {
        let store = FileStore::open_in_memory().unwrap();
        store.set_item("k", "first").unwrap();
        store.set_item("k", "second").unwrap();
        assert_eq!(store.get_item("k").unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn entries_survive_reopening_the_same_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("seen.db");

        {
            let store = FileStore::open(&path).unwrap();
            store.set_item("k", "v").unwrap();
        }

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get_item("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn open_is_idempotent_on_an_initialized_store() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("seen.db");
        drop(FileStore::open(&path).unwrap());
        drop(FileStore::open(&path).unwrap());
    }

    #[test]
    fn tracker_hidden_transition_persists_across_reopen() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("seen.db");
        let instant = Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();

        {
            let document = Rc::new(Document::new());
            let _handle = activate(
                Config::new()
                    .storage(Rc::new(FileStore::open(&path).unwrap()))
                    .element(Rc::clone(&document) as Rc<dyn seen_core::VisibilitySource>)
                    .clock(Rc::new(FixedClock::new(instant))),
            )
            .unwrap();
            document
                .set_visibility_state(VisibilityState::Hidden)
                .unwrap();
        }

        let handle = activate(
            Config::new()
                .storage(Rc::new(FileStore::open(&path).unwrap()))
                .element(Rc::new(Document::new())),
        )
        .unwrap();
        assert_eq!(handle.current_result().unwrap().last_seen, Some(instant));
    }
}
