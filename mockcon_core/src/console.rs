//! Console abstraction and the native console implementation.
//!
//! A [`Console`] is anything exposing named logging methods. [`NativeConsole`]
//! is the concrete implementation: it owns a method table, the per-console
//! state behind `count`, `time` and `group`, and decides what text each call
//! emits and on which stream. Where that text goes is up to the caller of
//! [`NativeConsole::invoke`].

use crate::format::{inspect, render_args};
use crate::pretty::{JsonPrinter, PrettyPrinter};
use crate::{Arg, Error, MockConsole, Result, Stream};
use std::collections::{BTreeMap, HashMap};
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

/// A console-like object with an open-ended set of named methods
pub trait Console: Send + Sync {
    /// Names of all invocable methods
    fn methods(&self) -> Vec<String>;

    /// Invoke a method by name
    fn call(&self, method: &str, args: &[Arg]) -> Result<()>;

    fn has_method(&self, method: &str) -> bool {
        self.methods().iter().any(|m| m == method)
    }

    /// The mock behind this console, if it was built by the factory
    fn as_mock(&self) -> Option<&MockConsole> {
        None
    }
}

/// Native behaviour of a console method
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MethodKind {
    /// Format the arguments and print them
    Print(Stream),
    Trace,
    Dir,
    Group,
    GroupEnd,
    Count,
    CountReset,
    Time,
    TimeLog,
    TimeEnd,
    Assert,
    Clear,
}

const CORE_METHODS: &[(&str, MethodKind)] = &[
    ("log", MethodKind::Print(Stream::Stdout)),
    ("info", MethodKind::Print(Stream::Stdout)),
    ("debug", MethodKind::Print(Stream::Stdout)),
    ("dirxml", MethodKind::Print(Stream::Stdout)),
    ("table", MethodKind::Print(Stream::Stdout)),
    ("warn", MethodKind::Print(Stream::Stderr)),
    ("error", MethodKind::Print(Stream::Stderr)),
    ("trace", MethodKind::Trace),
    ("dir", MethodKind::Dir),
    ("group", MethodKind::Group),
    ("groupCollapsed", MethodKind::Group),
    ("groupEnd", MethodKind::GroupEnd),
    ("count", MethodKind::Count),
    ("countReset", MethodKind::CountReset),
    ("time", MethodKind::Time),
    ("timeLog", MethodKind::TimeLog),
    ("timeEnd", MethodKind::TimeEnd),
    ("assert", MethodKind::Assert),
    ("clear", MethodKind::Clear),
];

const GROUP_INDENT: usize = 2;
const DEFAULT_LABEL: &str = "default";

#[derive(Default)]
struct NativeState {
    indent: usize,
    counts: HashMap<String, u64>,
    timers: HashMap<String, Instant>,
}

/// Where a native console writes when called through [`Console::call`]
enum Output {
    Stdio,
    Writer(Mutex<Box<dyn Write + Send>>),
    Detached,
}

/// The underlying console: method table, native state and output
pub struct NativeConsole {
    methods: BTreeMap<String, MethodKind>,
    state: Mutex<NativeState>,
    printer: Arc<dyn PrettyPrinter>,
    output: Output,
}

impl NativeConsole {
    fn with_output(output: Output) -> Self {
        Self {
            methods: CORE_METHODS
                .iter()
                .map(|(name, kind)| (name.to_string(), *kind))
                .collect(),
            state: Mutex::new(NativeState::default()),
            printer: Arc::new(JsonPrinter),
            output,
        }
    }

    /// Console writing to the process stdout and stderr
    pub fn stdio() -> Self {
        Self::with_output(Output::Stdio)
    }

    /// Console writing both streams to a single writer
    pub fn writer(writer: impl Write + Send + 'static) -> Self {
        Self::with_output(Output::Writer(Mutex::new(Box::new(writer))))
    }

    /// Console whose output only reaches callers of [`invoke`](Self::invoke)
    pub fn detached() -> Self {
        Self::with_output(Output::Detached)
    }

    /// Register an additional printing method
    pub fn with_method(mut self, name: impl Into<String>, stream: Stream) -> Self {
        self.methods.insert(name.into(), MethodKind::Print(stream));
        self
    }

    pub fn with_printer(mut self, printer: Arc<dyn PrettyPrinter>) -> Self {
        self.printer = printer;
        self
    }

    pub fn method_kind(&self, method: &str) -> Option<MethodKind> {
        self.methods.get(method).copied()
    }

    /// Run a method's native behaviour, handing whatever it emits to `emit`.
    ///
    /// Arguments are rendered before any internal lock is taken and `emit` runs
    /// after it is released, so rendering or emitting may log re-entrantly.
    pub fn invoke(
        &self,
        method: &str,
        args: &[Arg],
        emit: &mut dyn FnMut(Stream, &str) -> Result<()>,
    ) -> Result<()> {
        let kind = self
            .method_kind(method)
            .ok_or_else(|| Error::UnknownMethod(method.to_string()))?;

        let rendered = self.render(kind, args)?;
        let output = self.apply(kind, args, rendered);

        match output {
            Some((stream, chunk)) => emit(stream, &chunk),
            None => Ok(()),
        }
    }

    /// Argument text a method needs, computed without holding the state lock
    fn render(&self, kind: MethodKind, args: &[Arg]) -> Result<String> {
        let printer = self.printer.as_ref();
        match kind {
            MethodKind::Print(_) | MethodKind::Trace | MethodKind::Group => {
                render_args(args, printer)
            }
            MethodKind::Dir => match args.first() {
                Some(arg) => inspect(arg, printer),
                None => Ok("undefined".into()),
            },
            MethodKind::TimeLog | MethodKind::Assert => {
                render_args(args.get(1..).unwrap_or_default(), printer)
            }
            _ => Ok(String::new()),
        }
    }

    /// Update native state and produce the emitted chunk, if any
    fn apply(&self, kind: MethodKind, args: &[Arg], text: String) -> Option<(Stream, String)> {
        let mut state = self.lock_state();
        let indent = state.indent;
        let line = |stream: Stream, text: String| Some((stream, indent_lines(&text, indent)));

        match kind {
            MethodKind::Print(stream) => line(stream, text),
            MethodKind::Dir => line(Stream::Stdout, text),
            MethodKind::Trace => {
                if text.is_empty() {
                    line(Stream::Stderr, "Trace".into())
                } else {
                    line(Stream::Stderr, format!("Trace: {}", text))
                }
            }
            MethodKind::Group => {
                state.indent += GROUP_INDENT;
                if args.is_empty() {
                    None
                } else {
                    line(Stream::Stdout, text)
                }
            }
            MethodKind::GroupEnd => {
                state.indent = state.indent.saturating_sub(GROUP_INDENT);
                None
            }
            MethodKind::Count => {
                let label = label(args);
                let count = state.counts.entry(label.clone()).or_insert(0);
                *count += 1;
                let text = format!("{}: {}", label, count);
                line(Stream::Stdout, text)
            }
            MethodKind::CountReset => {
                let label = label(args);
                if state.counts.remove(&label).is_some() {
                    None
                } else {
                    line(
                        Stream::Stderr,
                        format!("Count for '{}' does not exist", label),
                    )
                }
            }
            MethodKind::Time => {
                let label = label(args);
                if state.timers.contains_key(&label) {
                    line(
                        Stream::Stderr,
                        format!("Label '{}' already exists for console.time()", label),
                    )
                } else {
                    state.timers.insert(label, Instant::now());
                    None
                }
            }
            MethodKind::TimeLog | MethodKind::TimeEnd => {
                let label = label(args);
                let timer = if kind == MethodKind::TimeEnd {
                    state.timers.remove(&label)
                } else {
                    state.timers.get(&label).copied()
                };
                match timer {
                    Some(started) => {
                        let elapsed = started.elapsed().as_secs_f64() * 1000.0;
                        let mut text_out = format!("{}: {:.3}ms", label, elapsed);
                        if kind == MethodKind::TimeLog && !text.is_empty() {
                            text_out.push(' ');
                            text_out.push_str(&text);
                        }
                        line(Stream::Stdout, text_out)
                    }
                    None => {
                        let name = if kind == MethodKind::TimeEnd {
                            "timeEnd"
                        } else {
                            "timeLog"
                        };
                        line(
                            Stream::Stderr,
                            format!("No such label '{}' for console.{}()", label, name),
                        )
                    }
                }
            }
            MethodKind::Assert => {
                if args.first().is_some_and(Arg::is_truthy) {
                    return None;
                }
                let message = match args.get(1) {
                    None => "Assertion failed".to_string(),
                    Some(Arg::Str(_)) => format!("Assertion failed: {}", text),
                    Some(_) => format!("Assertion failed {}", text),
                };
                line(Stream::Stderr, message)
            }
            MethodKind::Clear => None,
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, NativeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self, stream: Stream, chunk: &str) -> Result<()> {
        match &self.output {
            Output::Stdio => match stream {
                Stream::Stdout => io::stdout().lock().write_all(chunk.as_bytes())?,
                Stream::Stderr => io::stderr().lock().write_all(chunk.as_bytes())?,
            },
            Output::Writer(writer) => {
                let mut writer = writer.lock().unwrap_or_else(PoisonError::into_inner);
                writer.write_all(chunk.as_bytes())?;
                writer.flush()?;
            }
            Output::Detached => {}
        }
        Ok(())
    }
}

impl Console for NativeConsole {
    fn methods(&self) -> Vec<String> {
        self.methods.keys().cloned().collect()
    }

    fn call(&self, method: &str, args: &[Arg]) -> Result<()> {
        self.invoke(method, args, &mut |stream, chunk| self.write(stream, chunk))
    }

    fn has_method(&self, method: &str) -> bool {
        self.methods.contains_key(method)
    }
}

/// Label argument of `count`, `time` and friends
fn label(args: &[Arg]) -> String {
    match args.first() {
        None | Some(Arg::Undefined) => DEFAULT_LABEL.to_string(),
        Some(arg) => arg
            .primitive_string()
            .unwrap_or_else(|| DEFAULT_LABEL.to_string()),
    }
}

/// Prefix every line with the group indentation and terminate the chunk
fn indent_lines(text: &str, indent: usize) -> String {
    let mut out = String::with_capacity(text.len() + 1);
    if indent == 0 {
        out.push_str(text);
    } else {
        let pad = " ".repeat(indent);
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(&pad);
            out.push_str(line);
        }
    }
    out.push('\n');
    out
}
