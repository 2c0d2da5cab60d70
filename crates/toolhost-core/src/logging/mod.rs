//! Event log abstractions
//!
//! Components depend only on `EventLog::log(event_type, message)`; the sink
//! behind it is chosen by whoever builds the host.

mod traits;
mod noop;
mod console;
mod memory;
pub mod jsonl;

pub use traits::{event, EventLog, FanoutEventLog, SharedEventLog};
pub use noop::NoOpEventLog;
pub use console::ConsoleEventLog;
pub use memory::MemoryEventLog;
pub use jsonl::{JsonlEventLog, LogEntry, DEFAULT_LOG_PATH};
