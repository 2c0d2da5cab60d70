//! In-memory configuration provider

use async_trait::async_trait;

use crate::types::ProviderConfig;
use super::settings::ConfigFile;
use super::traits::{ConfigProvider, ConfigResult};

/// In-memory configuration provider for testing
#[derive(Debug, Default)]
pub struct MemoryConfigProvider {
    config: ConfigFile,
}

impl MemoryConfigProvider {
    /// Create a new empty memory config provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a memory config provider with initial servers
    pub fn with_servers(servers: Vec<ProviderConfig>) -> Self {
        Self {
            config: ConfigFile {
                servers,
                ..Default::default()
            },
        }
    }

    /// Create a memory config provider from a full config
    pub fn with_config(config: ConfigFile) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ConfigProvider for MemoryConfigProvider {
    async fn load(&self) -> ConfigResult<ConfigFile> {
        self.config.validate()?;
        Ok(self.config.clone())
    }
}
