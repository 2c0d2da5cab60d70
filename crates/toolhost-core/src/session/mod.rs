//! Tool provider sessions
//!
//! A session owns one provider process and its stdio pipes:
//! - `StructuredSession`: rmcp client over a spawned child process
//! - `RawSession`: hand-framed line-delimited JSON-RPC
//!
//! Both present the same contract through [`ToolSession`]:
//!
//! ```rust,ignore
//! let mut session = RawSession::new(config, SessionOptions::default(), log);
//! session.initialize().await?;
//! let tools = session.list_tools().await?;
//! let output = session.call_tool("echo", json!({ "text": "hi" })).await?;
//! session.close().await?;
//! ```

mod error;
mod mcp;
mod rpc;
mod stderr;

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::logging::SharedEventLog;
use crate::types::{ProviderConfig, ToolDescriptor, ToolOutput, TransportKind};

pub use error::{StartupError, TransportError, TransportResult};
pub use mcp::StructuredSession;
pub use rpc::RawSession;

/// MCP protocol version announced by the raw transport
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Lifecycle state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Configured,
    Online,
    Closed,
}

/// Timeouts and client identity shared by every session
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Upper bound on a single request/response exchange
    pub request_timeout: Duration,
    /// Upper bound on spawn plus initialize
    pub handshake_timeout: Duration,
    /// Optional pause after spawn before the handshake is sent
    pub warmup: Duration,
    /// Time a provider gets to exit after its stdin is closed
    pub shutdown_grace: Duration,
    pub protocol_version: String,
    pub client_name: String,
    pub client_version: String,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            handshake_timeout: Duration::from_secs(10),
            warmup: Duration::ZERO,
            shutdown_grace: Duration::from_secs(2),
            protocol_version: PROTOCOL_VERSION.to_string(),
            client_name: "toolhost".to_string(),
            client_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// One live connection to one tool provider process
#[async_trait]
pub trait ToolSession: Send + Sync {
    /// Provider name, unique within a host
    fn name(&self) -> &str;

    /// Transport variant driving this session
    fn transport(&self) -> TransportKind;

    fn state(&self) -> SessionState;

    /// Spawn the provider and complete the handshake
    async fn initialize(&mut self) -> Result<(), StartupError>;

    /// Ask the provider for its tool catalog
    async fn list_tools(&self) -> TransportResult<Vec<ToolDescriptor>>;

    /// Invoke one tool and normalize its result
    async fn call_tool(&self, name: &str, args: Value) -> TransportResult<ToolOutput>;

    /// Release the pipes and stop the process; safe to call twice
    async fn close(&mut self) -> TransportResult<()>;
}

/// Build the session variant a provider's transport string selects
pub fn create_session(
    config: ProviderConfig,
    options: SessionOptions,
    log: SharedEventLog,
) -> Result<Box<dyn ToolSession>, StartupError> {
    match config.transport_kind() {
        Some(TransportKind::Structured) => Ok(Box::new(StructuredSession::new(config, options, log))),
        Some(TransportKind::Raw) => Ok(Box::new(RawSession::new(config, options, log))),
        None => Err(StartupError::UnknownTransport {
            session: config.name,
            transport: config.transport,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpEventLog;
    use std::sync::Arc;

    #[test]
    fn test_create_session_picks_transport() {
        let log: SharedEventLog = Arc::new(NoOpEventLog);

        let structured = create_session(
            ProviderConfig::new("fs", "python"),
            SessionOptions::default(),
            log.clone(),
        )
        .unwrap();
        assert_eq!(structured.transport(), TransportKind::Structured);
        assert_eq!(structured.state(), SessionState::Configured);

        let raw = create_session(
            ProviderConfig::new("remote", "ssh").with_args(["box", "server"]),
            SessionOptions::default(),
            log.clone(),
        )
        .unwrap();
        assert_eq!(raw.transport(), TransportKind::Raw);
        assert_eq!(raw.name(), "remote");
    }

    #[test]
    fn test_create_session_rejects_unknown_transport() {
        let log: SharedEventLog = Arc::new(NoOpEventLog);
        let err = create_session(
            ProviderConfig::new("web", "node").with_transport("websocket"),
            SessionOptions::default(),
            log,
        )
        .err()
        .unwrap();

        assert!(matches!(err, StartupError::UnknownTransport { ref transport, .. } if transport == "websocket"));
    }

    #[test]
    fn test_default_options() {
        let options = SessionOptions::default();
        assert_eq!(options.protocol_version, "2024-11-05");
        assert_eq!(options.shutdown_grace, Duration::from_secs(2));
    }
}
