//! Tool router: resolves a tool name to its owning session and dispatches
//!
//! Two resolution modes:
//!
//! - `RouteMode::Live` asks every live session for its tools at call time.
//!   The owner is always current, at the cost of one `tools/list` round trip
//!   per session per call. A provider can still change its tool set between
//!   that query and the dispatch that follows.
//! - `RouteMode::Catalog` uses the host's last `expose_tools()` snapshot.
//!   No extra round trips, but a tool added or removed since the refresh is
//!   routed by stale data.
//!
//! Either way, ties go to the first session in configuration order.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::host::SessionHost;
use crate::log_event;
use crate::logging::{event, SharedEventLog};
use crate::session::ToolSession;
use crate::types::{Tool, ToolOutput};
use super::error::{RoutingError, ToolError};

/// How the router finds a tool's owning session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteMode {
    /// Query live sessions on every call
    #[default]
    Live,
    /// Use the host's last catalog snapshot
    Catalog,
}

/// Something that can advertise tools and run them
///
/// The orchestrator depends on this rather than on the router directly.
#[async_trait]
pub trait ToolDispatcher: Send + Sync {
    /// Tools to offer the model
    fn advertised_tools(&self) -> Vec<Tool>;

    /// Run one tool call and return its normalized output
    async fn call(&self, name: &str, args: &Value) -> Result<ToolOutput, ToolError>;
}

/// Routes tool calls to the sessions of one host
pub struct ToolRouter<'a> {
    host: &'a SessionHost,
    mode: RouteMode,
    log: SharedEventLog,
}

impl<'a> ToolRouter<'a> {
    pub fn new(host: &'a SessionHost, mode: RouteMode, log: SharedEventLog) -> Self {
        Self { host, mode, log }
    }

    pub fn mode(&self) -> RouteMode {
        self.mode
    }

    /// Find the session that owns `name`, without dispatching anything
    pub async fn resolve(&self, name: &str) -> Result<&'a dyn ToolSession, RoutingError> {
        let owner = match self.mode {
            RouteMode::Catalog => self
                .host
                .catalog()
                .iter()
                .find(|descriptor| descriptor.name == name)
                .and_then(|descriptor| self.host.session(&descriptor.session)),
            RouteMode::Live => self.resolve_live(name).await,
        };

        owner.ok_or_else(|| RoutingError::ToolNotFound { tool: name.to_string() })
    }

    async fn resolve_live(&self, name: &str) -> Option<&'a dyn ToolSession> {
        for session in self.host.sessions() {
            match session.list_tools().await {
                Ok(tools) if tools.iter().any(|tool| tool.name == name) => return Some(session),
                Ok(_) => {}
                Err(e) => {
                    log_event!(
                        self.log,
                        event::WARNING,
                        "[{}] skipped while resolving {}: {}",
                        session.name(),
                        name,
                        e
                    );
                }
            }
        }
        None
    }
}

#[async_trait]
impl<'a> ToolDispatcher for ToolRouter<'a> {
    fn advertised_tools(&self) -> Vec<Tool> {
        self.host.advertised_tools()
    }

    async fn call(&self, name: &str, args: &Value) -> Result<ToolOutput, ToolError> {
        let session = match self.resolve(name).await {
            Ok(session) => session,
            Err(e) => {
                log_event!(self.log, event::ERROR, "tool={} session=- outcome=not_found", name);
                return Err(e.into());
            }
        };

        match session.call_tool(name, args.clone()).await {
            Ok(output) => {
                let outcome = if output.is_error { "tool_error" } else { "ok" };
                log_event!(
                    self.log,
                    event::TOOL,
                    "tool={} session={} outcome={} segments={}",
                    name,
                    session.name(),
                    outcome,
                    output.segments.len()
                );
                Ok(output)
            }
            Err(source) => {
                log_event!(
                    self.log,
                    event::ERROR,
                    "tool={} session={} outcome=failed: {}",
                    name,
                    session.name(),
                    source
                );
                Err(ToolError::Transport {
                    session: session.name().to_string(),
                    source,
                })
            }
        }
    }
}
