//! JSON Lines scripts of console calls.
//!
//! Each line is one call: `{"method": "log", "args": ["Hello %s!", "World"]}`.
//! Blank lines are skipped, and malformed lines are logged and skipped.

use crate::console::Console;
use crate::{Arg, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// One scripted console call
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ScriptCall {
    pub method: String,
    #[serde(default)]
    pub args: Vec<serde_json::Value>,
}

impl ScriptCall {
    pub fn to_args(&self) -> Vec<Arg> {
        self.args.iter().cloned().map(Arg::from).collect()
    }
}

/// Read all calls from a script file
pub fn read_script(path: &Path) -> Result<Vec<ScriptCall>> {
    let file = File::open(path)?;
    let calls = parse_script(BufReader::new(file))?;
    tracing::debug!("Read {} calls from {:?}", calls.len(), path);
    Ok(calls)
}

/// Parse calls from any buffered reader
pub fn parse_script<R: BufRead>(reader: R) -> Result<Vec<ScriptCall>> {
    let mut calls = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<ScriptCall>(&line) {
            Ok(call) => calls.push(call),
            Err(e) => {
                tracing::warn!("Failed to parse call at line {}: {}", line_num + 1, e);
            }
        }
    }

    Ok(calls)
}

/// Run every call against `console`, stopping at the first failure.
/// Returns the number of calls made.
pub fn replay(console: &dyn Console, calls: &[ScriptCall]) -> Result<usize> {
    for call in calls {
        console.call(&call.method, &call.to_args())?;
    }
    Ok(calls.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_console, Error, Level, MockOptions};
    use std::io::Write;

    const SCRIPT: &str = r#"{"method": "log", "args": ["Hello %s!", "World"]}

{"method": "warn", "args": ["careful"]}
not json at all
{"method": "info", "args": ["%o", {"foo": 42}]}
{"method": "count"}
"#;

    #[test]
    fn test_parse_skips_blank_and_malformed_lines() {
        let calls = parse_script(SCRIPT.as_bytes()).unwrap();
        assert_eq!(calls.len(), 4);
        assert_eq!(calls[0].method, "log");
        assert!(calls[3].args.is_empty());
    }

    #[test]
    fn test_replay_into_mock() {
        let calls = parse_script(SCRIPT.as_bytes()).unwrap();
        let console = create_console(MockOptions::default());

        assert_eq!(replay(&console, &calls).unwrap(), 4);

        let record = console.record();
        assert_eq!(record.level(Level::Log), "Hello World!");
        assert_eq!(record.level(Level::Warn), "careful");
        assert_eq!(record.level(Level::Info), "{\n  \"foo\": 42\n}\ndefault: 1");
    }

    #[test]
    fn test_replay_stops_on_unknown_method() {
        let calls = parse_script(
            "{\"method\": \"log\", \"args\": [1]}\n{\"method\": \"shout\"}\n{\"method\": \"log\"}\n"
                .as_bytes(),
        )
        .unwrap();
        let console = create_console(MockOptions::default());

        let err = replay(&console, &calls).unwrap_err();
        assert!(matches!(err, Error::UnknownMethod(_)));
        assert_eq!(console.record().log(), "1");
    }

    #[test]
    fn test_read_script_from_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("calls.jsonl");
        let mut file = File::create(&path).unwrap();
        file.write_all(SCRIPT.as_bytes()).unwrap();

        let calls = read_script(&path).unwrap();
        assert_eq!(calls.len(), 4);
    }

    #[test]
    fn test_read_missing_script() {
        let temp_dir = tempfile::tempdir().unwrap();
        let err = read_script(&temp_dir.path().join("missing.jsonl")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
