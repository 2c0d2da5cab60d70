//! Model client trait definition

use async_trait::async_trait;

use crate::types::{Message, Tool};
use super::error::ModelResult;

/// One model call: the full conversation plus what the model may use
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelRequest {
    /// System directive
    pub system: String,
    /// Conversation so far, oldest first
    pub messages: Vec<Message>,
    /// Tools advertised for this call; empty means none
    pub tools: Vec<Tool>,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
}

impl ModelRequest {
    pub fn new(system: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            system: system.into(),
            messages,
            ..Default::default()
        }
    }

    /// Set tools
    pub fn with_tools(mut self, tools: Vec<Tool>) -> Self {
        self.tools = tools;
        self
    }

    /// Set max tokens
    pub fn with_max_tokens(mut self, tokens: Option<u32>) -> Self {
        self.max_tokens = tokens;
        self
    }
}

/// The conversational model the orchestrator talks to
///
/// Implementations:
/// - `GenaiModel`: Real model APIs through the `genai` crate
/// - `ScriptedModel`: Deterministic replies for tests
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Model identifier, for logging
    fn name(&self) -> &str;

    /// Send one request and return the assistant's answer
    async fn complete(&self, request: ModelRequest) -> ModelResult<Message>;

    /// Confirm the model answers at all, spending a single output token
    async fn check_connection(&self) -> ModelResult<()> {
        let request = ModelRequest::new("", vec![Message::user("ping")]).with_max_tokens(Some(1));
        self.complete(request).await.map(|_| ())
    }
}
