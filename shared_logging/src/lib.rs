#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

//! Structured JSON-lines logging shared across semforge crates.

use std::{
    collections::VecDeque,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::Result;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Log severity level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// Fine-grained diagnostics.
    Debug,
    /// Informational events.
    Info,
    /// Recoverable anomalies.
    Warn,
    /// Failures.
    Error,
}

/// One structured log record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    /// Capture time.
    pub timestamp: DateTime<Utc>,
    /// Component emitting the record.
    pub module: String,
    /// Severity.
    pub level: LogLevel,
    /// Human-readable message.
    pub message: String,
    /// Structured fields attached to the record.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl LogRecord {
    /// Creates a record stamped with the current time.
    #[must_use]
    pub fn new(module: impl Into<String>, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            module: module.into(),
            level,
            message: message.into(),
            fields: serde_json::Map::new(),
        }
    }

    /// Attaches the object entries of `value` as structured fields.
    #[must_use]
    pub fn with_fields(mut self, value: &serde_json::Value) -> Self {
        if let Some(object) = value.as_object() {
            self.fields = object.clone();
        }
        self
    }
}

/// Destination accepting log records.
pub trait LogSink: Send + Sync {
    /// Writes one record to the sink.
    fn write(&self, record: &LogRecord) -> Result<()>;
}

/// File-backed sink appending one JSON document per line.
#[derive(Debug)]
pub struct JsonlSink {
    path: PathBuf,
    writer: Mutex<File>,
}

impl JsonlSink {
    /// Creates or opens the sink at `path`, creating parent directories.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;
        Ok(Self {
            path,
            writer: Mutex::new(file),
        })
    }

    /// Path of the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogSink for JsonlSink {
    fn write(&self, record: &LogRecord) -> Result<()> {
        let mut writer = self.writer.lock();
        serde_json::to_writer(&mut *writer, record)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

/// In-memory ring sink retaining the most recent records. Intended for
/// tests and interactive inspection.
#[derive(Debug)]
pub struct MemorySink {
    capacity: usize,
    records: Mutex<VecDeque<LogRecord>>,
}

impl MemorySink {
    /// Creates a ring retaining at most `capacity` records.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            records: Mutex::new(VecDeque::new()),
        }
    }

    /// Snapshot of retained records, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<LogRecord> {
        self.records.lock().iter().cloned().collect()
    }
}

impl LogSink for MemorySink {
    fn write(&self, record: &LogRecord) -> Result<()> {
        let mut records = self.records.lock();
        records.push_back(record.clone());
        if records.len() > self.capacity {
            records.pop_front();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn jsonl_sink_appends_lines() {
        let dir = tempdir().unwrap();
        let sink = JsonlSink::open(dir.path().join("semforge.log")).unwrap();
        sink.write(&LogRecord::new("pipeline", LogLevel::Info, "phase complete"))
            .unwrap();
        sink.write(&LogRecord::new("pipeline", LogLevel::Warn, "low confidence"))
            .unwrap();
        let content = fs::read_to_string(sink.path()).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.contains("\"message\":\"phase complete\""));
    }

    #[test]
    fn record_fields_are_serialized() {
        let record = LogRecord::new("tagger", LogLevel::Debug, "tagged")
            .with_fields(&json!({ "pos": "noun", "index": 2 }));
        let line = serde_json::to_string(&record).unwrap();
        assert!(line.contains("\"pos\":\"noun\""));
    }

    #[test]
    fn memory_sink_evicts_oldest() {
        let sink = MemorySink::new(2);
        for message in ["a", "b", "c"] {
            sink.write(&LogRecord::new("test", LogLevel::Info, message))
                .unwrap();
        }
        let snapshot = sink.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].message, "b");
        assert_eq!(snapshot[1].message, "c");
    }
}
