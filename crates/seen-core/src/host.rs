//! Process-ambient defaults for the host-provided capabilities.
//!
//! The tracker never hard-codes a singleton: configuration resolution falls
//! back to these thread-local defaults only when the corresponding field was
//! left unset, and embedders (or tests) may replace them.

use std::cell::RefCell;
use std::rc::Rc;

use crate::storage::{MemoryStore, StorageProvider};
use crate::visibility::Document;

thread_local! {
    static DEFAULT_STORAGE: RefCell<Rc<dyn StorageProvider>> =
        RefCell::new(Rc::new(MemoryStore::new()));
    static DEFAULT_DOCUMENT: RefCell<Rc<Document>> = RefCell::new(Rc::new(Document::new()));
}

/// The storage provider used when [`Config::storage`](crate::Config::storage)
/// is unset.
///
/// Starts as an in-memory store; hosts wanting persistence across runs
/// install a durable provider via [`set_default_storage`].
#[must_use]
pub fn default_storage() -> Rc<dyn StorageProvider> {
    DEFAULT_STORAGE.with(|storage| Rc::clone(&storage.borrow()))
}

/// Replaces the ambient storage provider for this thread.
pub fn set_default_storage(storage: Rc<dyn StorageProvider>) {
    DEFAULT_STORAGE.with(|slot| *slot.borrow_mut() = storage);
}

/// The document observed when [`Config::element`](crate::Config::element)
/// is unset.
#[must_use]
pub fn default_document() -> Rc<Document> {
    DEFAULT_DOCUMENT.with(|document| Rc::clone(&document.borrow()))
}

/// Replaces the ambient document for this thread.
pub fn set_default_document(document: Rc<Document>) {
    DEFAULT_DOCUMENT.with(|slot| *slot.borrow_mut() = document);
}
