//! Tool provider configuration types

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Transport string for providers driven through the embedded MCP client
pub const TRANSPORT_STDIO: &str = "stdio";

/// Transport string for providers driven through hand-framed JSON-RPC
pub const TRANSPORT_RAW: &str = "raw";

/// How the host talks to a provider process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// Handshake and correlation delegated to the rmcp client
    Structured,
    /// Line-delimited JSON-RPC framed by hand over the child's stdio
    Raw,
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportKind::Structured => write!(f, "structured"),
            TransportKind::Raw => write!(f, "raw"),
        }
    }
}

fn default_transport() -> String {
    TRANSPORT_STDIO.to_string()
}

/// Configuration for one tool provider process
///
/// Immutable once loaded; `name` is the provider's unique key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Unique provider name
    pub name: String,
    /// Transport kind ("stdio" or "raw")
    #[serde(default = "default_transport")]
    pub transport: String,
    /// Launch command
    pub command: String,
    /// Launch arguments
    #[serde(default)]
    pub args: Vec<String>,
    /// Extra environment variables for the child process
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
    /// Working directory for the child process
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,
}

impl ProviderConfig {
    /// Create a stdio provider configuration
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transport: default_transport(),
            command: command.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
            cwd: None,
        }
    }

    /// Set the launch arguments
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Set the transport string
    pub fn with_transport(mut self, transport: impl Into<String>) -> Self {
        self.transport = transport.into();
        self
    }

    /// Add an environment variable
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Set the working directory
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Resolve the transport string to a transport kind
    ///
    /// A `stdio` provider launched through `ssh` is driven by the raw
    /// transport. Unknown transport strings yield `None`.
    pub fn transport_kind(&self) -> Option<TransportKind> {
        match self.transport.to_lowercase().as_str() {
            TRANSPORT_RAW => Some(TransportKind::Raw),
            TRANSPORT_STDIO if self.command == "ssh" => Some(TransportKind::Raw),
            TRANSPORT_STDIO => Some(TransportKind::Structured),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_resolution() {
        let stdio = ProviderConfig::new("fs", "python").with_args(["server.py"]);
        assert_eq!(stdio.transport_kind(), Some(TransportKind::Structured));

        let ssh = ProviderConfig::new("remote", "ssh").with_args(["host", "run-server"]);
        assert_eq!(ssh.transport_kind(), Some(TransportKind::Raw));

        let raw = ProviderConfig::new("echo", "./echo").with_transport("RAW");
        assert_eq!(raw.transport_kind(), Some(TransportKind::Raw));

        let sse = ProviderConfig::new("web", "x").with_transport("sse");
        assert_eq!(sse.transport_kind(), None);
    }

    #[test]
    fn test_deserialize_minimal_entry() {
        let config: ProviderConfig = serde_json::from_str(
            r#"{ "name": "emoji", "command": "uv", "args": ["run", "server.py"] }"#,
        )
        .unwrap();

        assert_eq!(config.transport, "stdio");
        assert_eq!(config.args, vec!["run", "server.py"]);
        assert!(config.env.is_empty());
        assert!(config.cwd.is_none());
    }
}
