//! The visibility tracker binding.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::config::{Config, Resolved};
use crate::storage::{StorageError, StorageProvider};
use crate::visibility::{Observer, ObserverId, VISIBILITY_CHANGE, VisibilitySource, VisibilityState};

/// What the tracker knows about the previous visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisibilityResult {
    /// Instant of the most recent recorded hidden transition, or `None` if
    /// storage held no prior entry.
    pub last_seen: Option<DateTime<Utc>>,
}

/// Reads the last-seen entry under `key` and builds a result.
///
/// Pure with respect to the store: safe to call at any time, idempotent
/// between writes. An absent or empty entry yields `None`. An entry that does
/// not parse as RFC 3339 is also treated as never-seen, rather than surfaced
/// as a bogus instant.
pub fn read_last_seen(
    storage: &dyn StorageProvider,
    key: &str,
) -> Result<VisibilityResult, StorageError> {
    let raw = storage.get_item(key)?;
    let last_seen = raw
        .filter(|value| !value.is_empty())
        .and_then(|value| match DateTime::parse_from_rfc3339(&value) {
            Ok(instant) => Some(instant.with_timezone(&Utc)),
            Err(error) => {
                tracing::warn!(key, %error, "ignoring unparseable last-seen entry");
                None
            }
        });
    Ok(VisibilityResult { last_seen })
}

/// Activates a tracker binding.
///
/// Resolves `config` against its defaults in one pass, evaluates the initial
/// result when results were requested, and registers the binding's single
/// `visibilitychange` observer. The only failure mode is the storage
/// provider's, passed through unmodified.
///
/// The observer, invoked synchronously per transition:
/// - hidden: writes the current instant (RFC 3339, millisecond precision,
///   `Z` suffix) under the storage key, then invokes `on_hide`; the result
///   state is not touched.
/// - otherwise: rebuilds the result from storage, updates the result state
///   iff results were requested, and always invokes `on_show` with it.
pub fn activate(config: Config) -> Result<Handle, StorageError> {
    let Resolved {
        mut on_hide,
        mut on_show,
        storage_key,
        return_result,
        storage,
        element,
        clock,
    } = config.resolve();
    tracing::debug!(key = %storage_key, return_result, "activating tracker");

    let initial = if return_result {
        Some(read_last_seen(storage.as_ref(), &storage_key)?)
    } else {
        None
    };
    let result = Rc::new(RefCell::new(initial));

    let observer: Observer = {
        let result = Rc::clone(&result);
        Rc::new(RefCell::new(move |state: VisibilityState| {
            if state.is_hidden() {
                let instant = clock.now().to_rfc3339_opts(SecondsFormat::Millis, true);
                storage.set_item(&storage_key, &instant)?;
                on_hide();
            } else {
                let current = read_last_seen(storage.as_ref(), &storage_key)?;
                if return_result {
                    *result.borrow_mut() = Some(current.clone());
                }
                on_show(&current);
            }
            Ok(())
        }))
    };
    let registration = element.subscribe(VISIBILITY_CHANGE, observer);

    Ok(Handle {
        element,
        registration: Some(registration),
        result,
    })
}

/// An active tracker binding.
///
/// Owns exactly one observer registration on its element; the registration
/// is released when the handle is deactivated or dropped.
pub struct Handle {
    element: Rc<dyn VisibilitySource>,
    registration: Option<ObserverId>,
    result: Rc<RefCell<Option<VisibilityResult>>>,
}

impl Handle {
    /// The current result state.
    ///
    /// `Some` only when the binding was configured to return a result; in
    /// that case it reflects the activation-time read, then each subsequent
    /// visible transition. Hidden transitions never change it.
    #[must_use]
    pub fn current_result(&self) -> Option<VisibilityResult> {
        self.result.borrow().clone()
    }

    /// Deregisters the observer. Equivalent to dropping the handle.
    pub fn deactivate(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(id) = self.registration.take() {
            self.element.unsubscribe(VISIBILITY_CHANGE, id);
            tracing::debug!("tracker deactivated");
        }
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("registration", &self.registration)
            .field("result", &self.result.borrow())
            .finish_non_exhaustive()
    }
}
