//! No-op event log implementation

use super::traits::EventLog;

/// An event log that does nothing
///
/// Useful for testing or when logging is not needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventLog;

impl NoOpEventLog {
    /// Create a new no-op log
    pub fn new() -> Self {
        Self
    }
}

impl EventLog for NoOpEventLog {
    fn log(&self, _event_type: &str, _message: &str) {}
}
