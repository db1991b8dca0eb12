#![forbid(unsafe_code)]

//! Capture console output in tests and query it as structured data.
//!
//! This crate provides:
//! - A console abstraction and a native console with printf-style formatting
//! - Mock consoles that record every call into per-level and per-method transcripts
//! - Installation of mocks over an ambient console, with restore on drop
//! - A per-test fixture for the ambient console
//! - JSON Lines replay scripts and configuration for the `mockcon` binary
//!
//! ```
//! use mockcon_core::{args, create_console, Console, Level, MockOptions};
//!
//! let console = create_console(MockOptions::default());
//! console.call("log", &args!["Hello %s!", "World"]).unwrap();
//! console.call("warn", &args!["careful"]).unwrap();
//!
//! let record = console.record();
//! assert_eq!(record.log(), "Hello World!\ncareful");
//! assert_eq!(record.level(Level::Warn), "careful");
//! ```

pub mod types;
pub mod error;
pub mod ansi;
pub mod pretty;
pub mod format;
pub mod console;
pub mod record;
pub mod mock;
mod intercept;
pub mod install;
pub mod fixture;
pub mod script;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::{Arg, Level, Stream};
pub use console::{Console, NativeConsole};
pub use record::{Entry, Record};
pub use mock::{
    create_console, create_console_with, MethodRef, MockConsole, MockOptions, Replacement,
};
pub use install::{
    get_log, get_log_ambient, mock_console, mock_global, original_console, silence_console,
    ConsoleScope, Restore,
};
pub use fixture::ConsoleFixture;
pub use pretty::{JsonPrinter, PrettyPrinter};
pub use config::Config;
