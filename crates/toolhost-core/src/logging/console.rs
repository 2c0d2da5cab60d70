//! Console event log implementation

use super::traits::EventLog;

/// An event log that writes to stderr
#[derive(Debug, Clone)]
pub struct ConsoleEventLog {
    prefix: String,
}

impl Default for ConsoleEventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleEventLog {
    /// Create a new console log with default prefix
    pub fn new() -> Self {
        Self {
            prefix: "[toolhost]".to_string(),
        }
    }

    /// Create a console log with a custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn format(&self, event_type: &str, message: &str) -> String {
        format!("{} {}: {}", self.prefix, event_type, message)
    }
}

impl EventLog for ConsoleEventLog {
    fn log(&self, event_type: &str, message: &str) {
        eprintln!("{}", self.format(event_type, message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_log_format() {
        let log = ConsoleEventLog::new();
        assert_eq!(log.format("ONLINE", "fs"), "[toolhost] ONLINE: fs");

        let custom = ConsoleEventLog::with_prefix("[chat]");
        assert_eq!(custom.format("TOOL", "x"), "[chat] TOOL: x");
    }
}
