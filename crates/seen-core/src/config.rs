//! Tracker configuration and its one-pass default resolution.

use std::fmt;
use std::rc::Rc;

use crate::clock::{Clock, SystemClock};
use crate::host;
use crate::storage::StorageProvider;
use crate::tracker::VisibilityResult;
use crate::visibility::VisibilitySource;

/// Storage key used when none is configured.
pub const DEFAULT_STORAGE_KEY: &str = "seen.lastSeenDateUtc";

/// Callback invoked on every transition to hidden.
pub type HideCallback = Box<dyn FnMut()>;

/// Callback invoked on every transition back to visible.
pub type ShowCallback = Box<dyn FnMut(&VisibilityResult)>;

/// Tracker configuration.
///
/// Every field is optional; unset fields resolve to the documented defaults
/// in a single pass when the binding is activated. Reusing a storage key
/// across bindings shares the persisted entry.
#[derive(Default)]
pub struct Config {
    on_hide: Option<HideCallback>,
    on_show: Option<ShowCallback>,
    storage_key: Option<String>,
    return_result: Option<bool>,
    storage: Option<Rc<dyn StorageProvider>>,
    element: Option<Rc<dyn VisibilitySource>>,
    clock: Option<Rc<dyn Clock>>,
}

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Invoked on every transition to hidden. Default: no-op.
    #[must_use]
    pub fn on_hide(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_hide = Some(Box::new(callback));
        self
    }

    /// Invoked with the freshly built result on every transition back to
    /// visible. Default: no-op.
    #[must_use]
    pub fn on_show(mut self, callback: impl FnMut(&VisibilityResult) + 'static) -> Self {
        self.on_show = Some(Box::new(callback));
        self
    }

    /// Identity of the persisted entry. Default: [`DEFAULT_STORAGE_KEY`].
    #[must_use]
    pub fn storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = Some(key.into());
        self
    }

    /// Whether the handle carries a result state. Default: true only when
    /// neither callback was supplied.
    #[must_use]
    pub fn return_result(mut self, value: bool) -> Self {
        self.return_result = Some(value);
        self
    }

    /// Where the last-seen entry lives. Default:
    /// [`host::default_storage`](crate::host::default_storage).
    #[must_use]
    pub fn storage(mut self, storage: Rc<dyn StorageProvider>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// The surface whose visibility is observed. Default:
    /// [`host::default_document`](crate::host::default_document).
    #[must_use]
    pub fn element(mut self, element: Rc<dyn VisibilitySource>) -> Self {
        self.element = Some(element);
        self
    }

    /// Time source for the persisted timestamp. Default: [`SystemClock`].
    #[must_use]
    pub fn clock(mut self, clock: Rc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Resolves every field against its default, producing the fully
    /// populated options the binding runs on.
    pub(crate) fn resolve(self) -> Resolved {
        // Derived before the no-op defaults are substituted: a result is
        // returned only when the caller supplied no callbacks at all.
        let return_result = self
            .return_result
            .unwrap_or(self.on_hide.is_none() && self.on_show.is_none());

        Resolved {
            on_hide: self.on_hide.unwrap_or_else(|| Box::new(|| {})),
            on_show: self.on_show.unwrap_or_else(|| Box::new(|_| {})),
            storage_key: self
                .storage_key
                .unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_owned()),
            return_result,
            storage: self.storage.unwrap_or_else(host::default_storage),
            element: self.element.unwrap_or_else(|| {
                let document: Rc<dyn VisibilitySource> = host::default_document();
                document
            }),
            clock: self.clock.unwrap_or_else(|| Rc::new(SystemClock)),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("on_hide", &self.on_hide.is_some())
            .field("on_show", &self.on_show.is_some())
            .field("storage_key", &self.storage_key)
            .field("return_result", &self.return_result)
            .finish_non_exhaustive()
    }
}

/// Fully populated options, resolved once per activation.
pub(crate) struct Resolved {
    pub(crate) on_hide: HideCallback,
    pub(crate) on_show: ShowCallback,
    pub(crate) storage_key: String,
    pub(crate) return_result: bool,
    pub(crate) storage: Rc<dyn StorageProvider>,
    pub(crate) element: Rc<dyn VisibilitySource>,
    pub(crate) clock: Rc<dyn Clock>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn return_result_defaults_to_true_without_callbacks() {
        assert!(Config::new().resolve().return_result);
    }

    #[test]
    fn any_supplied_callback_disables_the_result_by_default() {
        assert!(!Config::new().on_hide(|| {}).resolve().return_result);
        assert!(!Config::new().on_show(|_| {}).resolve().return_result);
        assert!(
            !Config::new()
                .on_hide(|| {})
                .on_show(|_| {})
                .resolve()
                .return_result
        );
    }

    #[test]
    fn explicit_return_result_overrides_the_derivation() {
        assert!(
            Config::new()
                .on_show(|_| {})
                .return_result(true)
                .resolve()
                .return_result
        );
        assert!(!Config::new().return_result(false).resolve().return_result);
    }

    #[test]
    fn storage_key_defaults_to_the_namespaced_constant() {
        assert_eq!(Config::new().resolve().storage_key, DEFAULT_STORAGE_KEY);
        assert_eq!(
            Config::new().storage_key("custom.key").resolve().storage_key,
            "custom.key"
        );
    }

    #[test]
    fn debug_never_exposes_callback_bodies() {
        let config = Config::new().on_hide(|| {}).storage_key("k");
        let rendered = format!("{config:?}");
        assert!(rendered.contains("on_hide: true"));
        assert!(rendered.contains("on_show: false"));
    }
}
