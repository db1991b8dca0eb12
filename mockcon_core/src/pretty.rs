//! Pretty-printing of structured console arguments.
//!
//! Objects, arrays, functions and opaque Rust values are never stringified
//! natively; they go through a [`PrettyPrinter`] so they show up in captured
//! output as readable multi-line text.

use crate::{Arg, Error, Result};

/// Renders a structured value as human-readable text
pub trait PrettyPrinter: Send + Sync {
    fn render(&self, arg: &Arg) -> Result<String>;
}

/// Default printer: pretty JSON for objects and arrays, `{:#?}` for Rust values
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonPrinter;

impl PrettyPrinter for JsonPrinter {
    fn render(&self, arg: &Arg) -> Result<String> {
        match arg {
            Arg::Json(value) => serde_json::to_string_pretty(value)
                .map_err(|e| Error::Render(format!("Failed to render value: {}", e))),
            Arg::Function { name: Some(name) } => Ok(format!("[Function {}]", name)),
            Arg::Function { name: None } => Ok("[Function anonymous]".into()),
            Arg::Debug(value) => Ok(format!("{:#?}", value)),
            Arg::Str(s) => Ok(format!("{:?}", s)),
            other => Ok(other.primitive_string().unwrap_or_default()),
        }
    }
}

/// Borrowed, call-scoped view of an argument that renders through a printer.
///
/// The argument itself is never touched; the association between value and
/// printer lives only as long as this wrapper.
pub(crate) struct Inspect<'a> {
    pub arg: &'a Arg,
    pub printer: &'a dyn PrettyPrinter,
}

impl Inspect<'_> {
    /// Native string for primitives, printer output for everything else
    pub fn to_text(&self) -> Result<String> {
        match self.arg.primitive_string() {
            Some(s) => Ok(s),
            None => self.printer.render(self.arg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug)]
    #[allow(dead_code)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[test]
    fn test_object_renders_multiline() {
        let text = JsonPrinter.render(&Arg::Json(json!({"foo": 42}))).unwrap();
        assert_eq!(text, "{\n  \"foo\": 42\n}");
    }

    #[test]
    fn test_function_rendering() {
        assert_eq!(
            JsonPrinter.render(&Arg::function("foo")).unwrap(),
            "[Function foo]"
        );
        assert_eq!(
            JsonPrinter.render(&Arg::Function { name: None }).unwrap(),
            "[Function anonymous]"
        );
    }

    #[test]
    fn test_debug_value_rendering() {
        let text = JsonPrinter.render(&Arg::debug(Point { x: 1, y: 2 })).unwrap();
        assert!(text.starts_with("Point {\n"));
        assert!(text.contains("    x: 1,"));
    }

    #[test]
    fn test_inspect_passes_primitives_through() {
        let arg = Arg::Str("plain".into());
        let inspect = Inspect {
            arg: &arg,
            printer: &JsonPrinter,
        };
        assert_eq!(inspect.to_text().unwrap(), "plain");
    }
}
