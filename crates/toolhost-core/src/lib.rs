//! Toolhost Core
//!
//! Host-side plumbing for tool-calling conversations over MCP-style tool
//! providers. Each provider is a child process spoken to over stdio, either
//! through the rmcp client (structured) or hand-framed line JSON-RPC (raw).
//!
//! ## Tool-use loop
//!
//! ```rust,ignore
//! use toolhost_core::{SessionHost, ToolRouter, RouteMode, Orchestrator, TurnOptions, GenaiModel};
//!
//! let mut host = SessionHost::new(servers, SessionOptions::default(), log.clone());
//! host.start_all().await;
//! host.expose_tools().await;
//!
//! let router = ToolRouter::new(&host, RouteMode::Live, log.clone());
//! let mut chat = Orchestrator::new(Arc::new(GenaiModel::new(model, log.clone())), TurnOptions::default(), log);
//! let answer = chat.run_turn(&router, "What files are in /tmp?").await?;
//!
//! host.stop_all().await;
//! ```

pub mod types;
pub mod logging;
pub mod config;
pub mod session;
pub mod host;
pub mod tools;
pub mod model;
pub mod chat;

// Re-export commonly used types
pub use types::{
    ContentBlock, Message, MessageRole, ProviderConfig, Tool, ToolCall, ToolDescriptor, ToolOutput,
    TransportKind,
};

pub use logging::{
    event, ConsoleEventLog, EventLog, FanoutEventLog, JsonlEventLog, MemoryEventLog, NoOpEventLog,
    SharedEventLog,
};

pub use config::{ChatSettings, ConfigError, ConfigFile, ConfigProvider, FileConfigProvider, MemoryConfigProvider};

pub use session::{
    RawSession, SessionOptions, SessionState, StartupError, StructuredSession, ToolSession,
    TransportError,
};

pub use host::{DefaultSessionFactory, SessionFactory, SessionHost};

pub use tools::{RouteMode, RoutingError, ToolDispatcher, ToolError, ToolRouter};

pub use model::{GenaiModel, ModelCallError, ModelClient, ModelRequest, ScriptedModel};

pub use chat::{Conversation, Orchestrator, TurnError, TurnOptions, TurnOutcome};
