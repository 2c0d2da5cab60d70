//! Configuration provider abstractions
//!
//! Supports multiple configuration sources:
//! - `MemoryConfigProvider`: In-memory for testing
//! - `FileConfigProvider`: JSON or YAML host config file

mod traits;
mod settings;
mod memory;
mod file;

pub use traits::{ConfigProvider, ConfigError, ConfigResult};
pub use settings::{ChatSettings, ConfigFile, SessionSettings, DEFAULT_MAX_TOOL_ROUNDS};
pub use memory::MemoryConfigProvider;
pub use file::{FileConfigProvider, ConfigFormat, CONFIG_FILE_NAME};
