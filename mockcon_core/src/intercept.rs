//! Method interception for mock consoles.
//!
//! Every method of a mock goes through [`MockConsole::intercept`]. The native
//! console does the formatting; the mock observes whatever the native method
//! emits and files it under the call's method and level. The method and level
//! travel with the call in a [`CallContext`], so a call made while another
//! call's arguments are being rendered is classified on its own.

use crate::ansi::strip_ansi;
use crate::record::Entry;
use crate::{Arg, Error, Level, MockConsole, Result};

/// Per-call classification state
#[derive(Clone, Copy, Debug)]
struct CallContext<'a> {
    method: &'a str,
    level: Option<Level>,
}

impl MockConsole {
    /// Classify, record and optionally forward one call
    pub(crate) fn intercept(&self, method: &str, args: &[Arg]) -> Result<()> {
        if self.inner.native.method_kind(method).is_none() {
            return Err(Error::UnknownMethod(method.to_string()));
        }

        if let Some(replacement) = self.track_call(method, args) {
            tracing::trace!(console = %self.id(), method, "Running one-off replacement");
            return replacement(args);
        }

        let call = CallContext {
            method,
            level: Level::classify(method),
        };

        tracing::trace!(
            console = %self.id(),
            method,
            level = ?call.level,
            args = args.len(),
            "Intercepted console call"
        );

        self.inner
            .native
            .invoke(method, args, &mut |_stream, chunk| {
                self.observe(call, chunk);
                Ok(())
            })?;

        if method == "clear" {
            self.clear();
        }

        self.forward(method, args)
    }

    /// Record one chunk of native output
    fn observe(&self, call: CallContext<'_>, chunk: &str) {
        let text = chunk.strip_suffix('\n').unwrap_or(chunk);
        let text = if self.inner.strip_ansi {
            strip_ansi(text).into_owned()
        } else {
            text.to_string()
        };

        self.lock_record().push(Entry {
            level: call.level,
            method: call.method.to_string(),
            text,
        });
    }

    /// Send the original arguments on to the passthrough target unless silenced
    fn forward(&self, method: &str, args: &[Arg]) -> Result<()> {
        if self.is_silent() {
            return Ok(());
        }

        let Some(target) = self.passthrough_target() else {
            return Ok(());
        };

        if !target.has_method(method) {
            tracing::debug!(
                console = %self.id(),
                method,
                "Passthrough target has no such method, not forwarding"
            );
            return Ok(());
        }

        target.call(method, args)
    }
}
