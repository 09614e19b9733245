//! Visibility states and the observable-element boundary.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::storage::StorageError;

/// Name of the change signal the tracker observes.
pub const VISIBILITY_CHANGE: &str = "visibilitychange";

/// Whether the host surface is currently shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VisibilityState {
    #[default]
    Visible,
    Hidden,
}

impl VisibilityState {
    /// Maps a raw signal value. Only the literal `"hidden"` denotes a hidden
    /// surface; any other value is treated as not hidden.
    #[must_use]
    pub fn from_signal(value: &str) -> Self {
        if value == "hidden" {
            Self::Hidden
        } else {
            Self::Visible
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Visible => "visible",
            Self::Hidden => "hidden",
        }
    }

    #[must_use]
    pub const fn is_hidden(&self) -> bool {
        matches!(self, Self::Hidden)
    }
}

impl fmt::Display for VisibilityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Callback registered for a named change signal.
///
/// Receives the element's visibility state as of dispatch time. A returned
/// error aborts the rest of the dispatch and propagates to the driver.
pub type Observer = Rc<RefCell<dyn FnMut(VisibilityState) -> Result<(), StorageError>>>;

/// Identifies one observer registration on one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// A surface whose visibility can be inspected and observed.
pub trait VisibilitySource {
    /// The current visibility indicator.
    fn visibility_state(&self) -> VisibilityState;

    /// Registers an observer for a named change signal.
    fn subscribe(&self, signal: &str, observer: Observer) -> ObserverId;

    /// Removes a previously registered observer. Unknown ids are ignored.
    fn unsubscribe(&self, signal: &str, id: ObserverId);
}

struct Registration {
    signal: String,
    id: ObserverId,
    observer: Observer,
}

/// Host-drivable stand-in for a document: tracks the current visibility
/// state and fans the change signal out to subscribed observers.
#[derive(Default)]
pub struct Document {
    state: Cell<VisibilityState>,
    next_id: Cell<u64>,
    registrations: RefCell<Vec<Registration>>,
}

impl Document {
    /// A visible document with no observers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the new state and dispatches the `visibilitychange` signal.
    ///
    /// Observers run synchronously in registration order, each to completion.
    /// The first observer error aborts the remainder of the dispatch and is
    /// returned to the caller unmodified.
    pub fn set_visibility_state(&self, state: VisibilityState) -> Result<(), StorageError> {
        self.state.set(state);
        tracing::debug!(state = state.as_str(), "visibility change");

        // Snapshot so observers may unsubscribe (themselves included) while
        // the dispatch is in flight; this round still sees the registration
        // list as of dispatch start.
        let observers: Vec<Observer> = self
            .registrations
            .borrow()
            .iter()
            .filter(|registration| registration.signal == VISIBILITY_CHANGE)
            .map(|registration| Rc::clone(&registration.observer))
            .collect();
        for observer in observers {
            (observer.borrow_mut())(state)?;
        }
        Ok(())
    }

    /// Number of live registrations for a signal.
    #[must_use]
    pub fn observer_count(&self, signal: &str) -> usize {
        self.registrations
            .borrow()
            .iter()
            .filter(|registration| registration.signal == signal)
            .count()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("state", &self.state.get())
            .field("observers", &self.registrations.borrow().len())
            .finish()
    }
}

impl VisibilitySource for Document {
    fn visibility_state(&self) -> VisibilityState {
        self.state.get()
    }

    fn subscribe(&self, signal: &str, observer: Observer) -> ObserverId {
        let id = ObserverId(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        self.registrations.borrow_mut().push(Registration {
            signal: signal.to_owned(),
            id,
            observer,
        });
        id
    }

    fn unsubscribe(&self, signal: &str, id: ObserverId) {
        self.registrations
            .borrow_mut()
            .retain(|registration| registration.signal != signal || registration.id != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_signal_maps_only_hidden() {
        assert_eq!(VisibilityState::from_signal("hidden"), VisibilityState::Hidden);
        assert_eq!(VisibilityState::from_signal("visible"), VisibilityState::Visible);
        assert_eq!(VisibilityState::from_signal("prerender"), VisibilityState::Visible);
        assert_eq!(VisibilityState::from_signal(""), VisibilityState::Visible);
    }

    #[test]
    fn dispatch_passes_current_state_in_registration_order() {
        let document = Document::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        for tag in ["a", "b"] {
            let seen = Rc::clone(&seen);
            document.subscribe(
                VISIBILITY_CHANGE,
                Rc::new(RefCell::new(move |state: VisibilityState| {
                    seen.borrow_mut().push((tag, state));
                    Ok(())
                })),
            );
        }

        document.set_visibility_state(VisibilityState::Hidden).unwrap();
        assert_eq!(document.visibility_state(), VisibilityState::Hidden);
        assert_eq!(
            *seen.borrow(),
            vec![("a", VisibilityState::Hidden), ("b", VisibilityState::Hidden)]
        );
    }

    #[test]
    fn unsubscribe_removes_only_the_matching_registration() {
        let document = Document::new();
        let calls = Rc::new(Cell::new(0));

        let first = {
            let calls = Rc::clone(&calls);
            document.subscribe(
                VISIBILITY_CHANGE,
                Rc::new(RefCell::new(move |_| {
                    calls.set(calls.get() + 1);
                    Ok(())
                })),
            )
        };
        let _second = {
            let calls = Rc::clone(&calls);
            document.subscribe(
                VISIBILITY_CHANGE,
                Rc::new(RefCell::new(move |_| {
                    calls.set(calls.get() + 1);
                    Ok(())
                })),
            )
        };

        document.unsubscribe(VISIBILITY_CHANGE, first);
        assert_eq!(document.observer_count(VISIBILITY_CHANGE), 1);

        document.set_visibility_state(VisibilityState::Visible).unwrap();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn observer_may_unsubscribe_mid_dispatch() {
        let document = Rc::new(Document::new());
        let calls = Rc::new(Cell::new(0));

        let id_slot: Rc<Cell<Option<ObserverId>>> = Rc::new(Cell::new(None));
        let id = {
            let document = Rc::clone(&document);
            let calls = Rc::clone(&calls);
            let id_slot = Rc::clone(&id_slot);
            document.clone().subscribe(
                VISIBILITY_CHANGE,
                Rc::new(RefCell::new(move |_| {
                    calls.set(calls.get() + 1);
                    if let Some(id) = id_slot.get() {
                        document.unsubscribe(VISIBILITY_CHANGE, id);
                    }
                    Ok(())
                })),
            )
        };
        id_slot.set(Some(id));

        document.set_visibility_state(VisibilityState::Hidden).unwrap();
        document.set_visibility_state(VisibilityState::Visible).unwrap();
        assert_eq!(calls.get(), 1);
        assert_eq!(document.observer_count(VISIBILITY_CHANGE), 0);
    }

    #[test]
    fn observer_error_aborts_dispatch() {
        let document = Document::new();
        let reached = Rc::new(Cell::new(false));

        document.subscribe(
            VISIBILITY_CHANGE,
            Rc::new(RefCell::new(|_| {
                Err(StorageError::read("k", std::io::Error::other("backend down")))
            })),
        );
        {
            let reached = Rc::clone(&reached);
            document.subscribe(
                VISIBILITY_CHANGE,
                Rc::new(RefCell::new(move |_| {
                    reached.set(true);
                    Ok(())
                })),
            );
        }

        let result = document.set_visibility_state(VisibilityState::Hidden);
        assert!(result.is_err());
        assert!(!reached.get());
    }
}
