//! Core types shared by sessions, the router and the orchestrator

mod message;
mod provider;
mod tool;

pub use message::{ContentBlock, Message, MessageRole};
pub use provider::{ProviderConfig, TransportKind, TRANSPORT_RAW, TRANSPORT_STDIO};
pub use tool::{Tool, ToolCall, ToolDescriptor, ToolOutput};
