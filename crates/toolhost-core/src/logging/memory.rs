//! In-memory event log

use parking_lot::Mutex;

use super::traits::EventLog;

/// Event log that keeps every entry in memory, for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryEventLog {
    entries: Mutex<Vec<(String, String)>>,
}

impl MemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded `(event_type, message)` pairs, oldest first
    pub fn entries(&self) -> Vec<(String, String)> {
        self.entries.lock().clone()
    }

    /// Messages recorded under one event type
    pub fn messages(&self, event_type: &str) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .filter(|(kind, _)| kind == event_type)
            .map(|(_, message)| message.clone())
            .collect()
    }

    /// Number of events recorded under one event type
    pub fn count(&self, event_type: &str) -> usize {
        self.entries
            .lock()
            .iter()
            .filter(|(kind, _)| kind == event_type)
            .count()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl EventLog for MemoryEventLog {
    fn log(&self, event_type: &str, message: &str) {
        self.entries
            .lock()
            .push((event_type.to_string(), message.to_string()));
    }
}
