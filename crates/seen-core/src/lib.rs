//! Last-seen visibility tracking.
//!
//! One reactive binding: observe a host surface's `visibilitychange` signal,
//! persist an ISO-8601 timestamp on every transition to hidden, and report a
//! [`VisibilityResult`] on activation and on every transition back to
//! visible. The persisted entry outlives the binding; the binding only reads
//! and writes it.
//!
//! Capabilities (storage, element, clock) are injectable through [`Config`];
//! unset fields resolve to the [`host`] defaults.
//!
//! ```
//! use std::rc::Rc;
//!
//! use seen_core::{
//!     Config, Document, MemoryStore, StorageProvider, VisibilitySource, VisibilityState, activate,
//! };
//!
//! let document = Rc::new(Document::new());
//! let storage = Rc::new(MemoryStore::new());
//!
//! let handle = activate(
//!     Config::new()
//!         .storage(Rc::clone(&storage) as Rc<dyn StorageProvider>)
//!         .element(Rc::clone(&document) as Rc<dyn VisibilitySource>),
//! )?;
//! assert!(handle.current_result().unwrap().last_seen.is_none());
//!
//! document.set_visibility_state(VisibilityState::Hidden)?;
//! document.set_visibility_state(VisibilityState::Visible)?;
//! assert!(handle.current_result().unwrap().last_seen.is_some());
//! # Ok::<(), seen_core::StorageError>(())
//! ```

mod clock;
mod config;
pub mod host;
mod storage;
mod tracker;
mod visibility;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{Config, DEFAULT_STORAGE_KEY, HideCallback, ShowCallback};
pub use storage::{MemoryStore, StorageError, StorageProvider};
pub use tracker::{Handle, VisibilityResult, activate, read_last_seen};
pub use visibility::{
    Document, Observer, ObserverId, VISIBILITY_CHANGE, VisibilitySource, VisibilityState,
};
