//! Per-test mock installation.
//!
//! A [`ConsoleFixture`] creates a fresh mock, installs it as the ambient
//! console and restores the previous console when dropped. Fixtures hold a
//! process-wide lock for their whole lifetime, so tests running on parallel
//! threads take turns on the ambient slot. Do not create a second fixture on
//! a thread that already holds one; install extra mocks with
//! [`mock_global`](crate::install::mock_global) instead.

use crate::install::{mock_global, Restore};
use crate::record::Record;
use crate::{create_console, MockConsole, MockOptions};
use std::sync::{Mutex, MutexGuard, PoisonError};

static FIXTURE_LOCK: Mutex<()> = Mutex::new(());

/// A mock installed over the ambient console for the duration of a test
pub struct ConsoleFixture {
    // Field order matters: restore before releasing the lock
    restore: Restore<'static>,
    console: MockConsole,
    _guard: MutexGuard<'static, ()>,
}

impl ConsoleFixture {
    /// Install a mock with default options
    pub fn install() -> Self {
        Self::with_options(MockOptions::default())
    }

    pub fn with_options(options: MockOptions) -> Self {
        let guard = FIXTURE_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        let console = create_console(options);
        let restore = mock_global(&console);

        Self {
            restore,
            console,
            _guard: guard,
        }
    }

    pub fn console(&self) -> &MockConsole {
        &self.console
    }

    /// Snapshot of everything captured so far
    pub fn log(&self) -> Record {
        self.console.record()
    }

    /// Restore the previous ambient console now instead of on drop
    pub fn restore(&mut self) {
        self.restore.restore();
    }
}
