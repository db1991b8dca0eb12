//! Logging infrastructure for mockcon.
//!
//! Diagnostics go through `tracing` and always to stderr, so they never mix
//! with console output being captured or printed on stdout.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize logging with sensible defaults
///
/// Default level is WARN, but can be overridden with RUST_LOG env var.
pub fn init() {
    init_with_level("warn")
}

/// Initialize logging with a specific default level
///
/// # Arguments
/// * `default_level` - Default log level (trace, debug, info, warn, error)
///
/// This can still be overridden by RUST_LOG environment variable.
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

/// Initialize logging for testing (captures logs for test output)
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("trace"))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::Console;
    use crate::{args, create_console, MockOptions};

    #[test]
    fn test_tracing_does_not_reach_the_record() {
        init_test();

        let console = create_console(MockOptions::default());
        console.call("log", &args!["only this"]).unwrap();
        assert_eq!(console.record().log(), "only this");
    }
}
