//! Mock console factory.
//!
//! [`create_console`] builds a [`MockConsole`]: a console whose every method
//! is intercepted and recorded into its own [`Record`]. Handles are cheap to
//! clone and all clones share one record; the record is dropped with the last
//! handle.
//!
//! Every method is also a spy: the arguments of each call are kept per method
//! whether or not the call printed anything, and a method's behaviour can be
//! replaced for its next call.

use crate::console::{Console, NativeConsole};
use crate::record::Record;
use crate::{Arg, Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

/// Options recognized by [`create_console`]
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MockOptions {
    /// Initial silence; a silent mock never forwards to its passthrough target
    #[serde(alias = "isSilent")]
    pub is_silent: bool,

    /// Remove ANSI escape sequences from captured text
    #[serde(alias = "stripAnsi", alias = "stripsAnsi")]
    pub strip_ansi: bool,
}

impl Default for MockOptions {
    fn default() -> Self {
        Self {
            is_silent: true,
            strip_ansi: false,
        }
    }
}

impl MockOptions {
    pub fn silent(mut self, is_silent: bool) -> Self {
        self.is_silent = is_silent;
        self
    }

    pub fn strip_ansi(mut self, strip_ansi: bool) -> Self {
        self.strip_ansi = strip_ansi;
        self
    }
}

/// Stand-in for a single call of one method
pub type Replacement = Box<dyn FnOnce(&[Arg]) -> Result<()> + Send>;

#[derive(Default)]
struct Spy {
    calls: BTreeMap<String, Vec<Vec<Arg>>>,
    once: HashMap<String, VecDeque<Replacement>>,
}

pub(crate) struct Inner {
    pub(crate) id: Uuid,
    pub(crate) native: NativeConsole,
    pub(crate) strip_ansi: bool,
    pub(crate) silent: AtomicBool,
    record: Mutex<Record>,
    spy: Mutex<Spy>,
    passthrough: Mutex<Option<Arc<dyn Console>>>,
}

/// A console that captures everything written through it
#[derive(Clone)]
pub struct MockConsole {
    pub(crate) inner: Arc<Inner>,
}

/// Create a mock console over a fresh, detached native console
pub fn create_console(options: MockOptions) -> MockConsole {
    create_console_with(NativeConsole::detached(), options)
}

/// Create a mock console over `native`, intercepting every method it exposes
pub fn create_console_with(native: NativeConsole, options: MockOptions) -> MockConsole {
    let console = MockConsole {
        inner: Arc::new(Inner {
            id: Uuid::new_v4(),
            native,
            strip_ansi: options.strip_ansi,
            silent: AtomicBool::new(options.is_silent),
            record: Mutex::new(Record::default()),
            spy: Mutex::new(Spy::default()),
            passthrough: Mutex::new(None),
        }),
    };

    tracing::debug!(
        console = %console.id(),
        silent = options.is_silent,
        strip_ansi = options.strip_ansi,
        "Created mock console"
    );
    console
}

impl MockConsole {
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// Whether two handles refer to the same mock
    pub fn ptr_eq(&self, other: &MockConsole) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Snapshot of the captured output
    pub fn record(&self) -> Record {
        self.lock_record().clone()
    }

    /// Read the record in place without cloning it
    pub fn with_record<T>(&self, f: impl FnOnce(&Record) -> T) -> T {
        f(&self.lock_record())
    }

    /// Empty the record, keeping this console's identity
    pub fn clear(&self) {
        self.lock_record().clear();
    }

    /// Arguments of every call made to `method`, oldest first
    pub fn calls(&self, method: &str) -> Vec<Vec<Arg>> {
        self.lock_spy()
            .calls
            .get(method)
            .cloned()
            .unwrap_or_default()
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.lock_spy().calls.get(method).map_or(0, Vec::len)
    }

    /// Run `replacement` instead of the next call to `method`.
    ///
    /// The replaced call is still counted but is neither recorded nor
    /// forwarded. Queued replacements run in the order they were added.
    pub fn replace_once(
        &self,
        method: &str,
        replacement: impl FnOnce(&[Arg]) -> Result<()> + Send + 'static,
    ) -> Result<()> {
        if self.inner.native.method_kind(method).is_none() {
            return Err(Error::UnknownMethod(method.to_string()));
        }
        self.lock_spy()
            .once
            .entry(method.to_string())
            .or_default()
            .push_back(Box::new(replacement));
        Ok(())
    }

    /// Forget tracked calls and pending replacements, leaving the record alone
    pub fn reset_calls(&self) {
        let mut spy = self.lock_spy();
        spy.calls.clear();
        spy.once.clear();
    }

    /// Note one call and take its replacement, if one is queued
    pub(crate) fn track_call(&self, method: &str, args: &[Arg]) -> Option<Replacement> {
        let mut spy = self.lock_spy();
        spy.calls
            .entry(method.to_string())
            .or_default()
            .push(args.to_vec());
        spy.once.get_mut(method).and_then(VecDeque::pop_front)
    }

    pub fn is_silent(&self) -> bool {
        self.inner.silent.load(Ordering::SeqCst)
    }

    pub(crate) fn set_silent(&self, silent: bool) {
        self.inner.silent.store(silent, Ordering::SeqCst);
    }

    pub fn passthrough_target(&self) -> Option<Arc<dyn Console>> {
        self.lock_passthrough().clone()
    }

    pub(crate) fn set_passthrough_target(&self, target: Option<Arc<dyn Console>>) {
        *self.lock_passthrough() = target;
    }

    /// Reference to a single method, carrying its name and this console
    pub fn method(&self, name: &str) -> Option<MethodRef> {
        self.inner.native.has_method(name).then(|| MethodRef {
            console: self.clone(),
            name: name.to_string(),
        })
    }

    /// References to every intercepted method
    pub fn method_refs(&self) -> Vec<MethodRef> {
        self.methods()
            .into_iter()
            .map(|name| MethodRef {
                console: self.clone(),
                name,
            })
            .collect()
    }

    pub(crate) fn lock_record(&self) -> MutexGuard<'_, Record> {
        self.inner
            .record
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_spy(&self) -> MutexGuard<'_, Spy> {
        self.inner.spy.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_passthrough(&self) -> MutexGuard<'_, Option<Arc<dyn Console>>> {
        self.inner
            .passthrough
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Console for MockConsole {
    fn methods(&self) -> Vec<String> {
        self.inner.native.methods()
    }

    fn call(&self, method: &str, args: &[Arg]) -> Result<()> {
        self.intercept(method, args)
    }

    fn has_method(&self, method: &str) -> bool {
        self.inner.native.has_method(method)
    }

    fn as_mock(&self) -> Option<&MockConsole> {
        Some(self)
    }
}

impl fmt::Debug for MockConsole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockConsole")
            .field("id", &self.inner.id)
            .field("silent", &self.is_silent())
            .field("strip_ansi", &self.inner.strip_ansi)
            .finish()
    }
}

/// One method of a mock console
#[derive(Clone, Debug)]
pub struct MethodRef {
    console: MockConsole,
    name: String,
}

impl MethodRef {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The console this method belongs to
    pub fn console(&self) -> &MockConsole {
        &self.console
    }

    pub fn call(&self, args: &[Arg]) -> Result<()> {
        self.console.intercept(&self.name, args)
    }

    /// Transcript of this method's calls
    pub fn record(&self) -> String {
        self.console
            .with_record(|record| record.get_record(&self.name).to_string())
    }

    pub fn calls(&self) -> Vec<Vec<Arg>> {
        self.console.calls(&self.name)
    }

    pub fn call_count(&self) -> usize {
        self.console.call_count(&self.name)
    }

    /// See [`MockConsole::replace_once`]
    pub fn replace_once(
        &self,
        replacement: impl FnOnce(&[Arg]) -> Result<()> + Send + 'static,
    ) -> Result<()> {
        self.console.replace_once(&self.name, replacement)
    }
}
