//! Configuration provider trait

use async_trait::async_trait;

use crate::types::ProviderConfig;
use super::settings::ConfigFile;

/// Configuration provider abstraction
///
/// Implementations:
/// - `MemoryConfigProvider`: In-memory for testing
/// - `FileConfigProvider`: JSON or YAML host config file
#[async_trait]
pub trait ConfigProvider: Send + Sync {
    /// Load and validate the whole configuration
    async fn load(&self) -> ConfigResult<ConfigFile>;

    /// Get all configured tool providers, in declaration order
    async fn get_servers(&self) -> ConfigResult<Vec<ProviderConfig>> {
        Ok(self.load().await?.servers)
    }
}

/// Errors that can occur during configuration operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Duplicate server name: {0}")]
    DuplicateServer(String),

    #[error("Invalid server entry: {0}")]
    InvalidServer(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
