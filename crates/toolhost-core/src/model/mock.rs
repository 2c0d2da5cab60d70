//! Scripted model for testing
//!
//! Replies come from a queue, in order. Once the queue is empty the model
//! echoes the last user text. Every request is recorded for assertions.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::types::{ContentBlock, Message, MessageRole};
use super::error::{ModelCallError, ModelResult};
use super::traits::{ModelClient, ModelRequest};

/// Deterministic model client
#[derive(Debug, Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<ModelResult<Message>>>,
    requests: Mutex<Vec<ModelRequest>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an arbitrary answer
    pub fn reply(self, message: Message) -> Self {
        self.replies.lock().push_back(Ok(message));
        self
    }

    /// Queue a plain text answer
    pub fn reply_text(self, text: impl Into<String>) -> Self {
        self.reply(Message::assistant(text))
    }

    /// Queue an answer asking for one tool
    pub fn reply_tool_use(self, id: &str, name: &str, input: Value) -> Self {
        self.reply(Message::with_blocks(
            MessageRole::Assistant,
            vec![ContentBlock::tool_use(id, name, input)],
        ))
    }

    /// Queue a failed call
    pub fn fail(self, message: impl Into<String>) -> Self {
        self.replies
            .lock()
            .push_back(Err(ModelCallError::api_error("scripted", message)));
        self
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }

    fn echo(request: &ModelRequest) -> Message {
        let last = request
            .messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User && !m.text().is_empty())
            .map(|m| m.text())
            .unwrap_or_else(|| "Hello from ScriptedModel!".to_string());
        Message::assistant(format!("Echo: {}", last))
    }
}

#[async_trait]
impl ModelClient for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ModelRequest) -> ModelResult<Message> {
        let reply = self.replies.lock().pop_front();
        let answer = reply.unwrap_or_else(|| Ok(Self::echo(&request)));
        self.requests.lock().push(request);
        answer
    }
}
