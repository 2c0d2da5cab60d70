//! File-based configuration provider (JSON or YAML)
//!
//! Looks for `./host_config.json` first, then the user-level
//! `~/.config/toolhost/host_config.json`.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::settings::ConfigFile;
use super::traits::{ConfigError, ConfigProvider, ConfigResult};

/// Default config file name
pub const CONFIG_FILE_NAME: &str = "host_config.json";

/// File format, picked from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => ConfigFormat::Yaml,
            _ => ConfigFormat::Json,
        }
    }
}

/// File-based configuration provider
///
/// The file is read on every `load`; the host reads it once at startup.
///
/// # Example
///
/// ```no_run
/// use toolhost_core::config::FileConfigProvider;
///
/// let config = FileConfigProvider::discover();
/// let explicit = FileConfigProvider::new("/etc/toolhost/servers.yaml");
/// ```
pub struct FileConfigProvider {
    path: PathBuf,
    format: ConfigFormat,
}

impl FileConfigProvider {
    /// Create a provider for a specific path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = ConfigFormat::from_path(&path);
        Self { path, format }
    }

    /// User-level config path (~/.config/toolhost/host_config.json)
    pub fn user_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".config"));
        config_dir.join("toolhost").join(CONFIG_FILE_NAME)
    }

    /// Use `./host_config.json` if it exists, otherwise the user-level file
    pub fn discover() -> Self {
        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            Self::new(local)
        } else {
            Self::new(Self::user_path())
        }
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> ConfigFormat {
        self.format
    }

    /// Check if the config file exists
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    fn parse(&self, content: &str) -> ConfigResult<ConfigFile> {
        let config: ConfigFile = match self.format {
            ConfigFormat::Json => serde_json::from_str(content)?,
            ConfigFormat::Yaml => serde_yaml::from_str(content)?,
        };
        config.validate()?;
        Ok(config)
    }
}

impl std::fmt::Debug for FileConfigProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileConfigProvider")
            .field("path", &self.path)
            .field("format", &self.format)
            .field("exists", &self.exists())
            .finish()
    }
}

#[async_trait]
impl ConfigProvider for FileConfigProvider {
    async fn load(&self) -> ConfigResult<ConfigFile> {
        if !self.exists() {
            return Err(ConfigError::NotFound(self.path.display().to_string()));
        }

        let content = fs::read_to_string(&self.path)?;
        self.parse(&content)
    }
}
