//! Conversation orchestrator: the model / tool exchange for one user turn
//!
//! ```text
//! AwaitingModel ─▶ ModelAnswered ─┬─▶ Done
//!                                 └─▶ ToolsPending ─▶ ToolsResolved ─▶ ModelAnswered ─▶ ...
//! ```
//!
//! A turn's messages are staged and only appended to the conversation once
//! the turn completes, so a failed model call leaves history untouched.

use std::sync::Arc;

use thiserror::Error;

use crate::config::ChatSettings;
use crate::log_event;
use crate::logging::{event, SharedEventLog};
use crate::model::{ModelCallError, ModelClient, ModelRequest};
use crate::tools::ToolDispatcher;
use crate::types::{ContentBlock, Message, MessageRole, Tool, ToolCall};
use super::conversation::Conversation;

/// Errors that abort a turn
#[derive(Error, Debug)]
pub enum TurnError {
    #[error("model call failed: {0}")]
    Model(#[from] ModelCallError),
}

/// Where a turn currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    AwaitingModel,
    ModelAnswered,
    ToolsPending,
    ToolsResolved,
    Done,
}

impl std::fmt::Display for TurnPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TurnPhase::AwaitingModel => "awaiting_model",
            TurnPhase::ModelAnswered => "model_answered",
            TurnPhase::ToolsPending => "tools_pending",
            TurnPhase::ToolsResolved => "tools_resolved",
            TurnPhase::Done => "done",
        };
        f.write_str(name)
    }
}

/// Per-turn behaviour
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOptions {
    /// System directive sent with every model call
    pub system: String,
    /// Maximum tokens per model answer
    pub max_tokens: Option<u32>,
    /// Re-advertise the tool catalog on follow-up calls
    pub chain_tools: bool,
    /// Tool rounds allowed per turn when chaining
    pub max_tool_rounds: usize,
}

impl Default for TurnOptions {
    fn default() -> Self {
        TurnOptions::from(&ChatSettings::default())
    }
}

impl From<&ChatSettings> for TurnOptions {
    fn from(settings: &ChatSettings) -> Self {
        Self {
            system: settings.system.clone(),
            max_tokens: settings.max_tokens,
            chain_tools: settings.chain_tools,
            max_tool_rounds: settings.max_tool_rounds.max(1),
        }
    }
}

/// What one turn produced
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    /// Final answer text
    pub text: String,
    /// Tool rounds run during the turn
    pub tool_rounds: usize,
    /// Model calls made during the turn
    pub model_calls: usize,
}

/// Drives the model and the tools for a running conversation
pub struct Orchestrator {
    model: Arc<dyn ModelClient>,
    options: TurnOptions,
    conversation: Conversation,
    log: SharedEventLog,
}

impl Orchestrator {
    pub fn new(model: Arc<dyn ModelClient>, options: TurnOptions, log: SharedEventLog) -> Self {
        Self {
            model,
            options,
            conversation: Conversation::new(),
            log,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn options(&self) -> &TurnOptions {
        &self.options
    }

    /// Run one user turn and return the final answer text
    pub async fn run_turn(&mut self, tools: &dyn ToolDispatcher, text: &str) -> Result<String, TurnError> {
        Ok(self.run_turn_detailed(tools, text).await?.text)
    }

    /// Run one user turn, reporting how many rounds and calls it took
    pub async fn run_turn_detailed(
        &mut self,
        tools: &dyn ToolDispatcher,
        text: &str,
    ) -> Result<TurnOutcome, TurnError> {
        let catalog = tools.advertised_tools();
        let mut staged = vec![Message::user(text)];
        let mut tool_rounds = 0;
        let mut model_calls = 0;

        self.phase(TurnPhase::AwaitingModel, &format!("tools={}", catalog.len()));
        let mut offered = catalog.clone();
        let mut answer = self.ask(&staged, offered.clone()).await?;
        model_calls += 1;

        let final_text = loop {
            self.phase(TurnPhase::ModelAnswered, &format!("call={}", model_calls));
            let calls = answer.tool_calls();

            if calls.is_empty() {
                let text = answer.text();
                staged.push(answer);
                break text;
            }

            if offered.is_empty() {
                log_event!(
                    self.log,
                    event::WARNING,
                    "model requested {} tool(s) without being offered any; ignoring",
                    calls.len()
                );
                let answer = answer.without_tool_use();
                let text = answer.text();
                staged.push(answer);
                break text;
            }

            self.phase(TurnPhase::ToolsPending, &format!("requests={}", calls.len()));
            staged.push(answer);
            staged.push(self.resolve_tools(tools, &calls).await);
            tool_rounds += 1;
            self.phase(TurnPhase::ToolsResolved, &format!("round={}", tool_rounds));

            let chain = self.options.chain_tools && tool_rounds < self.options.max_tool_rounds;
            offered = if chain { catalog.clone() } else { Vec::new() };
            answer = self.ask(&staged, offered.clone()).await?;
            model_calls += 1;
        };

        self.conversation.commit(staged);
        self.phase(
            TurnPhase::Done,
            &format!("model_calls={} tool_rounds={}", model_calls, tool_rounds),
        );

        Ok(TurnOutcome {
            text: final_text,
            tool_rounds,
            model_calls,
        })
    }

    async fn ask(&self, staged: &[Message], tools: Vec<Tool>) -> Result<Message, TurnError> {
        let request = ModelRequest::new(self.options.system.clone(), self.conversation.with_pending(staged))
            .with_tools(tools)
            .with_max_tokens(self.options.max_tokens);

        self.model.complete(request).await.map_err(|e| {
            log_event!(self.log, event::ERROR, "model {} failed, turn aborted: {}", self.model.name(), e);
            TurnError::Model(e)
        })
    }

    /// Run every requested tool in order, one result block per request
    async fn resolve_tools(&self, tools: &dyn ToolDispatcher, calls: &[ToolCall]) -> Message {
        let mut results = Vec::with_capacity(calls.len());
        for call in calls {
            let block = match tools.call(&call.name, &call.input).await {
                Ok(output) => ContentBlock::tool_result(&call.id, &output),
                Err(e) => {
                    log_event!(self.log, event::WARNING, "tool {} failed, reporting to model: {}", call.name, e);
                    ContentBlock::tool_error(&call.id, e.to_string())
                }
            };
            results.push(block);
        }
        Message::with_blocks(MessageRole::User, results)
    }

    fn phase(&self, phase: TurnPhase, detail: &str) {
        log_event!(self.log, event::TURN, "{} {}", phase, detail);
    }
}
