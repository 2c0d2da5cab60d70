//! Event log trait definition

use std::sync::Arc;

/// Append-only event log
///
/// Every component receives one of these and depends on nothing else for
/// logging. The core only ever writes; entries are never read back.
///
/// Implementations:
/// - `NoOpEventLog`: Silent log for tests
/// - `ConsoleEventLog`: Logs to stderr
/// - `JsonlEventLog`: Appends JSON lines to a file
/// - `MemoryEventLog`: Keeps entries in memory for assertions
/// - `FanoutEventLog`: Forwards to several logs
pub trait EventLog: Send + Sync {
    /// Record one event
    fn log(&self, event_type: &str, message: &str);
}

/// Type alias for an Arc-wrapped event log
pub type SharedEventLog = Arc<dyn EventLog>;

/// Event types emitted by the core
pub mod event {
    pub const DETECTED: &str = "DETECTED";
    pub const INIT: &str = "INIT";
    pub const ONLINE: &str = "ONLINE";
    pub const OFFLINE: &str = "OFFLINE";
    pub const TOOLS: &str = "TOOLS";
    pub const TOOL: &str = "TOOL";
    pub const ERROR: &str = "ERROR";
    pub const WARNING: &str = "WARNING";
    pub const DEBUG: &str = "DEBUG";
    pub const STDERR: &str = "STDERR";
    pub const CLOSED: &str = "CLOSED";
    pub const TURN: &str = "TURN";
    pub const MODEL: &str = "MODEL";
}

/// Forwards every event to each inner log, in order
pub struct FanoutEventLog {
    sinks: Vec<Arc<dyn EventLog>>,
}

impl FanoutEventLog {
    pub fn new(sinks: Vec<Arc<dyn EventLog>>) -> Self {
        Self { sinks }
    }
}

impl EventLog for FanoutEventLog {
    fn log(&self, event_type: &str, message: &str) {
        for sink in &self.sinks {
            sink.log(event_type, message);
        }
    }
}

/// Log a formatted event
///
/// ```rust,ignore
/// log_event!(log, event::ONLINE, "Server [{}] is online", name);
/// ```
#[macro_export]
macro_rules! log_event {
    ($log:expr, $event_type:expr, $($arg:tt)*) => {
        $log.log($event_type, &format!($($arg)*))
    };
}
