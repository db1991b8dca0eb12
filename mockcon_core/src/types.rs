//! Core types shared by the console, formatter and mock layers.
//!
//! - [`Level`]: the four severity buckets and the fixed method classification table
//! - [`Arg`]: a single logging argument, primitive or structured
//! - [`Stream`]: which native output stream a method writes to

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

// ============================================================================
// Levels
// ============================================================================

/// Severity bucket a console method is classified into
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Log,
    Info,
    Warn,
    Error,
}

impl Level {
    /// All levels, in classification lookup order
    pub const ALL: [Level; 4] = [Level::Log, Level::Info, Level::Warn, Level::Error];

    /// Method names that classify to this level
    pub fn methods(self) -> &'static [&'static str] {
        match self {
            Level::Log => &[
                "log",
                "trace",
                "dir",
                "dirxml",
                "group",
                "groupCollapsed",
                "debug",
                "timeLog",
            ],
            Level::Info => &["count", "info", "timeEnd"],
            Level::Warn => &["warn", "countReset"],
            Level::Error => &["error", "assert"],
        }
    }

    /// Classify a method name. Exact, case-sensitive match; the first level
    /// listing the method wins.
    pub fn classify(method: &str) -> Option<Level> {
        Level::ALL
            .into_iter()
            .find(|level| level.methods().contains(&method))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Level::Log => "log",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Level {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "log" => Ok(Level::Log),
            "info" => Ok(Level::Info),
            "warn" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            other => Err(crate::Error::Other(format!("Unknown level: {}", other))),
        }
    }
}

// ============================================================================
// Streams
// ============================================================================

/// Native output stream a console method writes to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

// ============================================================================
// Arguments
// ============================================================================

/// A single argument passed to a console method.
///
/// `Undefined`, `Null`, `Bool`, `Int`, `Float` and `Str` are primitives and
/// stringify natively. `Json`, `Function` and `Debug` are structured values
/// and are rendered by a [`PrettyPrinter`](crate::pretty::PrettyPrinter).
#[derive(Clone, Debug)]
pub enum Arg {
    Undefined,
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Object or array
    Json(serde_json::Value),
    /// A callable, identified by name (`None` for anonymous functions)
    Function { name: Option<String> },
    /// Opaque Rust value, rendered through its `Debug` impl
    Debug(Arc<dyn fmt::Debug + Send + Sync>),
}

impl Arg {
    /// Wrap any `Debug` value as a structured argument
    pub fn debug<T: fmt::Debug + Send + Sync + 'static>(value: T) -> Self {
        Arg::Debug(Arc::new(value))
    }

    pub fn function(name: impl Into<String>) -> Self {
        Arg::Function {
            name: Some(name.into()),
        }
    }

    pub fn is_primitive(&self) -> bool {
        !matches!(self, Arg::Json(_) | Arg::Function { .. } | Arg::Debug(_))
    }

    /// JavaScript-style truthiness, used by `assert`
    pub fn is_truthy(&self) -> bool {
        match self {
            Arg::Undefined | Arg::Null => false,
            Arg::Bool(b) => *b,
            Arg::Int(n) => *n != 0,
            Arg::Float(f) => *f != 0.0 && !f.is_nan(),
            Arg::Str(s) => !s.is_empty(),
            Arg::Json(_) | Arg::Function { .. } | Arg::Debug(_) => true,
        }
    }

    /// Native stringification of a primitive. Returns `None` for structured values.
    pub fn primitive_string(&self) -> Option<String> {
        match self {
            Arg::Undefined => Some("undefined".into()),
            Arg::Null => Some("null".into()),
            Arg::Bool(b) => Some(b.to_string()),
            Arg::Int(n) => Some(n.to_string()),
            Arg::Float(f) => Some(number_to_string(*f)),
            Arg::Str(s) => Some(s.clone()),
            _ => None,
        }
    }
}

/// Render a float the way a JavaScript console prints numbers
pub fn number_to_string(value: f64) -> String {
    if value.is_nan() {
        "NaN".into()
    } else if value == f64::INFINITY {
        "Infinity".into()
    } else if value == f64::NEG_INFINITY {
        "-Infinity".into()
    } else if value != 0.0 && (value.abs() >= 1e21 || value.abs() < 1e-6) {
        let exp = format!("{:e}", value);
        match exp.split_once('e') {
            Some((mantissa, power)) if !power.starts_with('-') => {
                format!("{}e+{}", mantissa, power)
            }
            _ => exp,
        }
    } else {
        value.to_string()
    }
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Arg::Str(value.to_string())
    }
}

impl From<String> for Arg {
    fn from(value: String) -> Self {
        Arg::Str(value)
    }
}

impl From<&String> for Arg {
    fn from(value: &String) -> Self {
        Arg::Str(value.clone())
    }
}

impl From<bool> for Arg {
    fn from(value: bool) -> Self {
        Arg::Bool(value)
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Arg {
                fn from(value: $ty) -> Self {
                    Arg::Int(value as i64)
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32, isize);

impl From<u64> for Arg {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(n) => Arg::Int(n),
            Err(_) => Arg::Float(value as f64),
        }
    }
}

impl From<usize> for Arg {
    fn from(value: usize) -> Self {
        Arg::from(value as u64)
    }
}

impl From<f32> for Arg {
    fn from(value: f32) -> Self {
        Arg::Float(value as f64)
    }
}

impl From<f64> for Arg {
    fn from(value: f64) -> Self {
        Arg::Float(value)
    }
}

impl<T: Into<Arg>> From<Option<T>> for Arg {
    fn from(value: Option<T>) -> Self {
        value.map_or(Arg::Undefined, Into::into)
    }
}

impl From<serde_json::Value> for Arg {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => Arg::Null,
            Value::Bool(b) => Arg::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Arg::Int(i),
                None => Arg::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => Arg::Str(s),
            other => Arg::Json(other),
        }
    }
}

/// Build a `Vec<Arg>` from heterogeneous values.
///
/// ```
/// use mockcon_core::{args, Arg};
///
/// let args: Vec<Arg> = args!["Hello %s, you are %d", "World", 42];
/// assert_eq!(args.len(), 3);
/// ```
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::Arg>::new()
    };
    ($($arg:expr),+ $(,)?) => {
        ::std::vec![$($crate::Arg::from($arg)),+]
    };
}
