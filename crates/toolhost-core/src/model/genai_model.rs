//! GenaiModel - model client using the genai crate
//!
//! genai picks the provider protocol from the model name (`claude-*` goes to
//! Anthropic, `gpt-*` to OpenAI, ...). The answer is streamed and assembled
//! into one assistant message.

use async_trait::async_trait;
use futures::StreamExt;
use genai::chat::ChatStreamEvent;

use crate::log_event;
use crate::logging::{event, SharedEventLog};
use crate::types::Message;
use super::error::{ModelCallError, ModelResult};
use super::genai_adapter::{
    assistant_message, create_client, extract_model_name, from_genai_tool_call, to_genai_options,
    to_genai_request,
};
use super::traits::{ModelClient, ModelRequest};

/// Model used when neither the config nor the environment names one
pub const DEFAULT_MODEL: &str = "claude-3-5-haiku-latest";

/// Model client for every genai-supported API
pub struct GenaiModel {
    /// Model identifier, optionally provider-prefixed
    model: String,
    /// Explicit API key; genai's environment lookup is used when absent
    api_key: Option<String>,
    log: SharedEventLog,
}

impl GenaiModel {
    pub fn new(model: impl Into<String>, log: SharedEventLog) -> Self {
        Self {
            model: model.into(),
            api_key: None,
            log,
        }
    }

    /// Set the API key
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Provider part of a prefixed model ("openai/gpt-4o" -> "openai")
    pub fn provider(&self) -> &str {
        self.model
            .split_once('/')
            .map(|(provider, _)| provider)
            .unwrap_or("genai")
    }
}

#[async_trait]
impl ModelClient for GenaiModel {
    fn name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: ModelRequest) -> ModelResult<Message> {
        let model_name = extract_model_name(&self.model);
        log_event!(
            self.log,
            event::MODEL,
            "request model={} messages={} tools={}",
            model_name,
            request.messages.len(),
            request.tools.len()
        );

        let client = create_client(self.api_key.clone());
        let chat_req = to_genai_request(&request)?;
        let genai_options = to_genai_options(&request);

        let chat_stream = client
            .exec_chat_stream(model_name, chat_req, Some(&genai_options))
            .await
            .map_err(|e| ModelCallError::api_error(self.provider(), e.to_string()))?;

        let mut stream = Box::pin(chat_stream.stream);
        let mut text = String::new();
        let mut tool_calls = Vec::new();
        let mut ended = false;

        while let Some(result) = stream.next().await {
            match result {
                Ok(ChatStreamEvent::Chunk(chunk)) => text.push_str(&chunk.content),
                Ok(ChatStreamEvent::End(end)) => {
                    if let Some(captured) = end.captured_tool_calls() {
                        tool_calls.extend(captured.iter().map(|tc| from_genai_tool_call(tc)));
                    }
                    ended = true;
                }
                Ok(_) => {}
                Err(e) => {
                    log_event!(self.log, event::ERROR, "model stream error: {}", e);
                    return Err(ModelCallError::api_error(self.provider(), e.to_string()));
                }
            }
        }

        if !ended {
            return Err(ModelCallError::invalid_response(
                self.provider(),
                "stream ended unexpectedly",
            ));
        }

        log_event!(
            self.log,
            event::MODEL,
            "answer chars={} tool_calls={}",
            text.len(),
            tool_calls.len()
        );
        Ok(assistant_message(text, tool_calls))
    }
}
