//! Session error types

use std::time::Duration;

use thiserror::Error;

/// A provider process could not be brought to the Online state
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("[{session}] unknown transport: {transport}")]
    UnknownTransport { session: String, transport: String },

    #[error("[{session}] failed to spawn {command}: {source}")]
    Spawn {
        session: String,
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("[{session}] exited during startup (code {code:?}): {stderr}")]
    Exited {
        session: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("[{session}] handshake timed out after {timeout:?}")]
    HandshakeTimeout { session: String, timeout: Duration },

    #[error("[{session}] handshake failed: {message}")]
    Handshake { session: String, message: String },
}

impl StartupError {
    /// Name of the session that failed to start
    pub fn session(&self) -> &str {
        match self {
            StartupError::UnknownTransport { session, .. }
            | StartupError::Spawn { session, .. }
            | StartupError::Exited { session, .. }
            | StartupError::HandshakeTimeout { session, .. }
            | StartupError::Handshake { session, .. } => session,
        }
    }
}

/// A request on an Online session failed
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("session is not online")]
    NotOnline,

    #[error("request {method} timed out after {timeout:?}")]
    Timeout { method: String, timeout: Duration },

    #[error("provider closed its output")]
    Closed,

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type TransportResult<T> = Result<T, TransportError>;
