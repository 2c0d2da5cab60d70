//! Host configuration file model

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::session::SessionOptions;
use crate::tools::RouteMode;
use crate::types::ProviderConfig;
use super::traits::{ConfigError, ConfigResult};

/// Tool rounds allowed per turn when chaining is on
pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 5;

/// Configuration file structure
///
/// ```json
/// { "servers": [ { "name": "fs", "transport": "stdio", "command": "python", "args": ["fs.py"] } ] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Configured tool providers
    #[serde(default)]
    pub servers: Vec<ProviderConfig>,

    /// Conversation settings
    #[serde(default)]
    pub chat: ChatSettings,

    /// Session timeouts
    #[serde(default)]
    pub session: SessionSettings,
}

impl ConfigFile {
    /// Reject entries the host could never start
    pub fn validate(&self) -> ConfigResult<()> {
        let mut seen = HashSet::new();
        for server in &self.servers {
            if server.name.trim().is_empty() {
                return Err(ConfigError::InvalidServer("server name must not be empty".into()));
            }
            if server.command.trim().is_empty() {
                return Err(ConfigError::InvalidServer(format!(
                    "server [{}] has an empty command",
                    server.name
                )));
            }
            if !seen.insert(server.name.as_str()) {
                return Err(ConfigError::DuplicateServer(server.name.clone()));
            }
        }
        Ok(())
    }
}

/// Conversation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    /// Model identifier passed to the model client
    pub model: Option<String>,
    /// System directive sent with every model call
    pub system: String,
    /// Maximum tokens per model answer
    pub max_tokens: Option<u32>,
    /// Re-advertise tools on follow-up calls, allowing chained tool use
    pub chain_tools: bool,
    /// Upper bound on tool rounds per turn when chaining is enabled
    pub max_tool_rounds: usize,
    /// How the router resolves a tool's owning session
    pub route_mode: RouteMode,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            model: None,
            system: "You are a helpful assistant. Use the available tools when they help answer the user.".to_string(),
            max_tokens: Some(1024),
            chain_tools: false,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
            route_mode: RouteMode::default(),
        }
    }
}

/// Session timeouts, in configuration-friendly units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub request_timeout_secs: u64,
    pub handshake_timeout_secs: u64,
    pub warmup_ms: u64,
    pub shutdown_grace_secs: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        let defaults = SessionOptions::default();
        Self {
            request_timeout_secs: defaults.request_timeout.as_secs(),
            handshake_timeout_secs: defaults.handshake_timeout.as_secs(),
            warmup_ms: defaults.warmup.as_millis() as u64,
            shutdown_grace_secs: defaults.shutdown_grace.as_secs(),
        }
    }
}

impl From<&SessionSettings> for SessionOptions {
    fn from(settings: &SessionSettings) -> Self {
        SessionOptions {
            request_timeout: Duration::from_secs(settings.request_timeout_secs),
            handshake_timeout: Duration::from_secs(settings.handshake_timeout_secs),
            warmup: Duration::from_millis(settings.warmup_ms),
            shutdown_grace: Duration::from_secs(settings.shutdown_grace_secs),
            ..SessionOptions::default()
        }
    }
}
