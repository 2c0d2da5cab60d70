//! File-backed event log
//!
//! Appends one JSON document per line. Entries are never rewritten, so a
//! crash leaves every previously written line intact.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::traits::EventLog;

/// Default location of the log file, relative to the working directory
pub const DEFAULT_LOG_PATH: &str = "logs/mcp-log.jsonl";

/// One line of the log file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub time: DateTime<Local>,
    #[serde(rename = "type")]
    pub event_type: String,
    pub payload: String,
}

impl LogEntry {
    pub fn now(event_type: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            time: Local::now(),
            event_type: event_type.into(),
            payload: payload.into(),
        }
    }
}

/// Append-only JSON-lines event log
pub struct JsonlEventLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonlEventLog {
    /// Open (or create) the log file, creating parent directories
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Get the log file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, entry: &LogEntry) -> io::Result<()> {
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        let mut file = self.file.lock();
        file.write_all(line.as_bytes())?;
        file.flush()
    }
}

impl EventLog for JsonlEventLog {
    fn log(&self, event_type: &str, message: &str) {
        // Logging must never take the host down
        let _ = self.append(&LogEntry::now(event_type, message));
    }
}

impl std::fmt::Debug for JsonlEventLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonlEventLog")
            .field("path", &self.path)
            .finish()
    }
}
