//! Capture record of a mock console.
//!
//! Entries are append-only. The per-level and per-method transcripts are
//! maintained alongside them on every push; the unified transcript is always
//! computed from the entries.

use crate::{Level, Result};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};
use std::io::Write;

/// Separator between entries in every transcript
pub const SEPARATOR: &str = "\n";

/// One piece of captured output
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Entry {
    pub level: Option<Level>,
    pub method: String,
    pub text: String,
}

/// Captured output of one mock console
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Record {
    entries: Vec<Entry>,
    levels: BTreeMap<Level, String>,
    methods: BTreeMap<String, String>,
}

#[derive(Serialize)]
struct RecordView<'a> {
    log: String,
    entries: &'a [Entry],
    levels: BTreeMap<Level, &'a str>,
    methods: &'a BTreeMap<String, String>,
}

impl Record {
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Unified transcript: every entry in call order
    pub fn log(&self) -> String {
        self.entries
            .iter()
            .map(|entry| entry.text.as_str())
            .collect::<Vec<_>>()
            .join(SEPARATOR)
    }

    /// Transcript of the entries classified to `level`
    pub fn level(&self, level: Level) -> &str {
        self.levels.get(&level).map_or("", String::as_str)
    }

    /// All four level transcripts, empty ones included
    pub fn levels(&self) -> impl Iterator<Item = (Level, &str)> + '_ {
        Level::ALL.into_iter().map(|level| (level, self.level(level)))
    }

    /// Transcript of the entries produced by `method`, or `""` if it was never called
    pub fn get_record(&self, method: &str) -> &str {
        self.methods.get(method).map_or("", String::as_str)
    }

    /// Per-method transcripts of every method that produced output
    pub fn methods(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.methods
            .iter()
            .map(|(method, text)| (method.as_str(), text.as_str()))
    }

    pub(crate) fn push(&mut self, entry: Entry) {
        if let Some(level) = entry.level {
            append(self.levels.entry(level), &entry.text);
        }
        append(self.methods.entry(entry.method.clone()), &entry.text);
        self.entries.push(entry);
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.levels.clear();
        self.methods.clear();
    }

    /// Serialize the record with all derived transcripts
    pub fn to_json(&self) -> Result<String> {
        let view = RecordView {
            log: self.log(),
            entries: &self.entries,
            levels: self.levels().collect(),
            methods: &self.methods,
        };
        Ok(serde_json::to_string_pretty(&view)?)
    }

    /// Write the entries as CSV with a `level,method,text` header
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        for entry in &self.entries {
            csv.serialize(entry)?;
        }
        csv.flush()?;
        Ok(())
    }
}

/// Join onto a transcript bucket. A bucket exists once it holds one entry, so
/// an empty first entry still gets a separator before the next one.
fn append<K: Ord>(bucket: btree_map::Entry<'_, K, String>, text: &str) {
    match bucket {
        btree_map::Entry::Vacant(slot) => {
            slot.insert(text.to_string());
        }
        btree_map::Entry::Occupied(mut slot) => {
            let existing = slot.get_mut();
            existing.push_str(SEPARATOR);
            existing.push_str(text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(method: &str, text: &str) -> Entry {
        Entry {
            level: Level::classify(method),
            method: method.to_string(),
            text: text.to_string(),
        }
    }

    fn record_of(calls: &[(&str, &str)]) -> Record {
        let mut record = Record::default();
        for (method, text) in calls {
            record.push(entry(method, text));
        }
        record
    }

    #[test]
    fn test_transcripts_stay_consistent() {
        let record = record_of(&[
            ("log", "a"),
            ("warn", "b"),
            ("debug", "c"),
            ("table", "d"),
            ("countReset", "e"),
        ]);

        assert_eq!(record.log(), "a\nb\nc\nd\ne");
        assert_eq!(record.level(Level::Log), "a\nc");
        assert_eq!(record.level(Level::Warn), "b\ne");
        assert_eq!(record.level(Level::Info), "");
        assert_eq!(record.get_record("debug"), "c");
        assert_eq!(record.get_record("table"), "d");
        assert_eq!(record.get_record("never"), "");
    }

    #[test]
    fn test_unclassified_entries_skip_level_buckets() {
        let record = record_of(&[("table", "x")]);
        assert!(record.levels().all(|(_, text)| text.is_empty()));
        assert_eq!(record.log(), "x");
    }

    #[test]
    fn test_empty_entries_keep_separators() {
        let record = record_of(&[("log", ""), ("log", "x")]);
        assert_eq!(record.log(), "\nx");
        assert_eq!(record.level(Level::Log), "\nx");
        assert_eq!(record.get_record("log"), "\nx");
    }

    #[test]
    fn test_level_and_method_buckets_match_entries() {
        let calls = [
            ("info", "1"),
            ("error", "2"),
            ("count", "3"),
            ("assert", "4"),
            ("timeLog", "5"),
            ("info", "6"),
        ];
        let record = record_of(&calls);

        for level in Level::ALL {
            let expected: Vec<_> = record
                .entries()
                .iter()
                .filter(|e| e.level == Some(level))
                .map(|e| e.text.as_str())
                .collect();
            assert_eq!(record.level(level), expected.join(SEPARATOR));
        }
        assert_eq!(record.get_record("info"), "1\n6");
    }

    #[test]
    fn test_clear() {
        let mut record = record_of(&[("log", "a")]);
        record.clear();
        assert!(record.is_empty());
        assert_eq!(record.log(), "");
        assert_eq!(record.get_record("log"), "");
    }

    #[test]
    fn test_json_view() {
        let record = record_of(&[("warn", "careful")]);
        let value: serde_json::Value = serde_json::from_str(&record.to_json().unwrap()).unwrap();
        assert_eq!(value["log"], "careful");
        assert_eq!(value["levels"]["warn"], "careful");
        assert_eq!(value["levels"]["log"], "");
        assert_eq!(value["methods"]["warn"], "careful");
        assert_eq!(value["entries"][0]["level"], "warn");
    }

    #[test]
    fn test_csv_output() {
        let record = record_of(&[("log", "hello, world"), ("table", "t")]);
        let mut out = Vec::new();
        record.write_csv(&mut out).unwrap();
        let csv = String::from_utf8(out).unwrap();
        assert_eq!(csv, "level,method,text\nlog,log,\"hello, world\"\n,table,t\n");
    }
}
