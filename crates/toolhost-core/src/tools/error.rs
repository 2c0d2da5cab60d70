//! Tool dispatch errors

use thiserror::Error;

use crate::session::TransportError;

/// No live session advertises the requested tool
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoutingError {
    #[error("tool not found: {tool}")]
    ToolNotFound { tool: String },
}

/// Failure of one routed tool call
#[derive(Error, Debug)]
pub enum ToolError {
    /// The tool does not exist; nothing was sent
    #[error(transparent)]
    Routing(#[from] RoutingError),

    /// The owning session failed to answer
    #[error("[{session}] {source}")]
    Transport {
        session: String,
        #[source]
        source: TransportError,
    },
}

impl ToolError {
    pub fn is_routing(&self) -> bool {
        matches!(self, ToolError::Routing(_))
    }

    /// Session the call was dispatched to, if it got that far
    pub fn session(&self) -> Option<&str> {
        match self {
            ToolError::Routing(_) => None,
            ToolError::Transport { session, .. } => Some(session),
        }
    }
}
