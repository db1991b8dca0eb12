//! Installing mock consoles in place of an ambient console.
//!
//! A [`ConsoleScope`] is a set of named console slots. The process-wide scope
//! ([`ConsoleScope::global`]) starts with a stdio console under
//! [`DEFAULT_KEY`], and the [`console!`](crate::console!) macro logs through
//! whatever currently occupies that slot.
//!
//! Install/restore pairs must nest: restoring out of order puts back whatever
//! the restored install replaced, even if a later install is still active.

use crate::console::{Console, NativeConsole};
use crate::record::Record;
use crate::{Arg, MockConsole, Result};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Slot name of the ambient console
pub const DEFAULT_KEY: &str = "console";

static ORIGINAL: Lazy<Arc<dyn Console>> = Lazy::new(|| Arc::new(NativeConsole::stdio()));

static GLOBAL: Lazy<ConsoleScope> = Lazy::new(|| {
    let scope = ConsoleScope::new();
    scope.set(DEFAULT_KEY, original_console());
    scope
});

/// The stdio console the global scope held before any mock was installed
pub fn original_console() -> Arc<dyn Console> {
    Arc::clone(&ORIGINAL)
}

/// Named console slots
#[derive(Default)]
pub struct ConsoleScope {
    slots: RwLock<HashMap<String, Arc<dyn Console>>>,
}

impl ConsoleScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scope holding a single console under [`DEFAULT_KEY`]
    pub fn with_console(console: Arc<dyn Console>) -> Self {
        let scope = Self::new();
        scope.set(DEFAULT_KEY, console);
        scope
    }

    /// The process-wide scope
    pub fn global() -> &'static ConsoleScope {
        &GLOBAL
    }

    pub fn get(&self, key: &str) -> Option<Arc<dyn Console>> {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Console under [`DEFAULT_KEY`]
    pub fn console(&self) -> Option<Arc<dyn Console>> {
        self.get(DEFAULT_KEY)
    }

    /// Replace a slot, returning its previous occupant
    pub fn set(&self, key: &str, console: Arc<dyn Console>) -> Option<Arc<dyn Console>> {
        self.slots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), console)
    }

    pub fn remove(&self, key: &str) -> Option<Arc<dyn Console>> {
        self.slots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
    }
}

/// Puts back the console a mock replaced.
///
/// Restores on [`restore`](Self::restore) or on drop, whichever comes first;
/// later calls do nothing.
#[must_use = "dropping a Restore immediately uninstalls the mock"]
pub struct Restore<'a> {
    scope: &'a ConsoleScope,
    key: String,
    mock: MockConsole,
    prior: Option<Option<Arc<dyn Console>>>,
    prior_target: Option<Arc<dyn Console>>,
}

impl Restore<'_> {
    pub fn restore(&mut self) {
        let Some(prior) = self.prior.take() else {
            return;
        };

        match prior {
            Some(console) => {
                self.scope.set(&self.key, console);
            }
            None => {
                self.scope.remove(&self.key);
            }
        }
        self.mock.set_passthrough_target(self.prior_target.take());

        tracing::debug!(console = %self.mock.id(), key = %self.key, "Restored console");
    }

    pub fn is_restored(&self) -> bool {
        self.prior.is_none()
    }
}

impl Drop for Restore<'_> {
    fn drop(&mut self) {
        self.restore();
    }
}

/// Install `mock` under `key` in `scope`. The replaced console becomes the
/// mock's passthrough target until the returned [`Restore`] puts back the
/// target the mock had before.
pub fn mock_console<'a>(mock: &MockConsole, scope: &'a ConsoleScope, key: &str) -> Restore<'a> {
    let prior_target = mock.passthrough_target();
    let prior = scope.set(key, Arc::new(mock.clone()));

    let target = prior
        .clone()
        .filter(|console| !console.as_mock().is_some_and(|m| m.ptr_eq(mock)));
    mock.set_passthrough_target(target);

    tracing::debug!(
        console = %mock.id(),
        key,
        replaced = prior.is_some(),
        "Installed mock console"
    );

    Restore {
        scope,
        key: key.to_string(),
        mock: mock.clone(),
        prior: Some(prior),
        prior_target,
    }
}

/// Install `mock` as the process-wide ambient console
pub fn mock_global(mock: &MockConsole) -> Restore<'static> {
    mock_console(mock, ConsoleScope::global(), DEFAULT_KEY)
}

/// Set whether a mock forwards to its passthrough target.
/// Returns `false` if `console` is not a mock.
pub fn silence_console(console: &dyn Console, should_silence: bool) -> bool {
    match console.as_mock() {
        Some(mock) => {
            mock.set_silent(should_silence);
            true
        }
        None => false,
    }
}

/// Snapshot of a mock's record; `None` for consoles not built by the factory
pub fn get_log(console: &dyn Console) -> Option<Record> {
    console.as_mock().map(MockConsole::record)
}

/// Record of whatever currently occupies the ambient slot
pub fn get_log_ambient() -> Option<Record> {
    get_log(ambient().as_ref())
}

/// The current ambient console
pub fn ambient() -> Arc<dyn Console> {
    ConsoleScope::global()
        .console()
        .unwrap_or_else(original_console)
}

/// Call a method on the ambient console
pub fn call(method: &str, args: &[Arg]) -> Result<()> {
    ambient().call(method, args)
}

/// Log through the ambient console.
///
/// ```
/// use mockcon_core::console;
///
/// console!(log, "Hello %s!", "World").unwrap();
/// console!(groupEnd).unwrap();
/// ```
#[macro_export]
macro_rules! console {
    ($method:ident $(, $arg:expr)* $(,)?) => {
        $crate::install::call(stringify!($method), &$crate::args![$($arg),*])
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{args, create_console, MockOptions};

    fn mock() -> MockConsole {
        create_console(MockOptions::default())
    }

    #[test]
    fn test_install_and_restore() {
        let original = mock();
        let scope = ConsoleScope::with_console(Arc::new(original.clone()));
        let replacement = mock();

        let mut restore = mock_console(&replacement, &scope, DEFAULT_KEY);
        scope.console().unwrap().call("log", &args!["captured"]).unwrap();

        assert_eq!(replacement.record().log(), "captured");
        assert!(original.record().is_empty());
        assert!(replacement.passthrough_target().is_some());

        restore.restore();
        assert!(restore.is_restored());
        assert!(replacement.passthrough_target().is_none());
        let current = scope.console().unwrap();
        assert!(current.as_mock().unwrap().ptr_eq(&original));
    }

    #[test]
    fn test_restore_is_idempotent() {
        let original = mock();
        let scope = ConsoleScope::with_console(Arc::new(original.clone()));

        let mut restore = mock_console(&mock(), &scope, DEFAULT_KEY);
        restore.restore();
        restore.restore();
        drop(restore);

        let current = scope.console().unwrap();
        assert!(current.as_mock().unwrap().ptr_eq(&original));
    }

    #[test]
    fn test_restore_on_drop() {
        let original = mock();
        let scope = ConsoleScope::with_console(Arc::new(original.clone()));
        {
            let _restore = mock_console(&mock(), &scope, DEFAULT_KEY);
            assert!(!scope.console().unwrap().as_mock().unwrap().ptr_eq(&original));
        }
        assert!(scope.console().unwrap().as_mock().unwrap().ptr_eq(&original));
    }

    #[test]
    fn test_nested_installs_unwind_in_order() {
        let original = mock();
        let scope = ConsoleScope::with_console(Arc::new(original.clone()));
        let first = mock();
        let second = mock();

        let mut outer = mock_console(&first, &scope, DEFAULT_KEY);
        let mut inner = mock_console(&second, &scope, DEFAULT_KEY);
        assert!(second
            .passthrough_target()
            .unwrap()
            .as_mock()
            .unwrap()
            .ptr_eq(&first));

        inner.restore();
        assert!(scope.console().unwrap().as_mock().unwrap().ptr_eq(&first));
        outer.restore();
        assert!(scope.console().unwrap().as_mock().unwrap().ptr_eq(&original));
    }

    #[test]
    fn test_install_into_missing_key() {
        let scope = ConsoleScope::new();
        let console = mock();

        let mut restore = mock_console(&console, &scope, "logger");
        assert!(scope.get("logger").is_some());
        assert!(console.passthrough_target().is_none());

        restore.restore();
        assert!(scope.get("logger").is_none());
    }

    #[test]
    fn test_silence_console_passthrough() {
        let not_silent = mock();
        let target = mock();
        let scope = ConsoleScope::with_console(Arc::new(target.clone()));

        let _restore = mock_console(&not_silent, &scope, DEFAULT_KEY);

        scope
            .console()
            .unwrap()
            .call("log", &args!["It should be silent"])
            .unwrap();
        assert_eq!(get_log(&not_silent).unwrap().log(), "It should be silent");
        assert_eq!(get_log(&target).unwrap().log(), "");

        not_silent.call("clear", &[]).unwrap();
        assert!(silence_console(&not_silent, false));

        scope
            .console()
            .unwrap()
            .call("log", &args!["It should not be silent"])
            .unwrap();
        assert_eq!(get_log(&not_silent).unwrap().log(), "It should not be silent");
        assert_eq!(get_log(&target).unwrap().log(), "It should not be silent");
    }

    #[test]
    fn test_silence_does_not_touch_target() {
        let console = mock();
        let scope = ConsoleScope::with_console(Arc::new(mock()));
        let _restore = mock_console(&console, &scope, DEFAULT_KEY);

        silence_console(&console, false);
        assert!(!console.is_silent());
        silence_console(&console, true);
        assert!(console.is_silent());
        assert!(console.passthrough_target().is_some());
    }

    #[test]
    fn test_misuse_on_native_console() {
        let native = NativeConsole::detached();
        assert!(get_log(&native).is_none());
        assert!(!silence_console(&native, false));
    }

    #[test]
    fn test_installing_over_itself_does_not_loop() {
        let console = mock();
        let scope = ConsoleScope::with_console(Arc::new(console.clone()));
        silence_console(&console, false);

        let _restore = mock_console(&console, &scope, DEFAULT_KEY);
        console.call("log", &args!["once"]).unwrap();
        assert_eq!(console.record().log(), "once");
    }

    #[test]
    fn test_reinstalling_a_mock_restores_its_previous_target() {
        let original = mock();
        let console = mock();
        let scope = ConsoleScope::with_console(Arc::new(original.clone()));
        silence_console(&console, false);

        let mut outer = mock_console(&console, &scope, DEFAULT_KEY);
        let mut inner = mock_console(&console, &scope, DEFAULT_KEY);
        assert!(console.passthrough_target().is_none());

        inner.restore();
        console.call("log", &args!["after inner restore"]).unwrap();
        assert_eq!(original.record().log(), "after inner restore");
        assert!(console
            .passthrough_target()
            .unwrap()
            .as_mock()
            .unwrap()
            .ptr_eq(&original));

        outer.restore();
        assert!(console.passthrough_target().is_none());
        assert!(scope.console().unwrap().as_mock().unwrap().ptr_eq(&original));
    }
}
