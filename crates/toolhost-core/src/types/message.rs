//! Conversation message types

use serde::{Deserialize, Serialize};

use super::tool::{ToolCall, ToolOutput};

/// Message role in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single block of message content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Plain text
    Text {
        text: String,
    },
    /// Tool use (assistant asking for a tool to be invoked)
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    /// Tool result (answer to exactly one tool use)
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        is_error: bool,
    },
}

impl ContentBlock {
    /// Create a text block
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }

    /// Create a tool use block
    pub fn tool_use(id: impl Into<String>, name: impl Into<String>, input: serde_json::Value) -> Self {
        ContentBlock::ToolUse {
            id: id.into(),
            name: name.into(),
            input,
        }
    }

    /// Create a tool result block from a tool's normalized output
    pub fn tool_result(tool_use_id: impl Into<String>, output: &ToolOutput) -> Self {
        ContentBlock::ToolResult {
            tool_use_id: tool_use_id.into(),
            content: output.text_content(),
            is_error: output.is_error,
        }
    }

    /// Create an error tool result block
    pub fn tool_error(tool_use_id: impl Into<String>, message: impl Into<String>) -> Self {
        ContentBlock::ToolResult {
            tool_use_id: tool_use_id.into(),
            content: message.into(),
            is_error: true,
        }
    }

    pub fn is_tool_use(&self) -> bool {
        matches!(self, ContentBlock::ToolUse { .. })
    }
}

/// A conversation turn: a role plus an ordered sequence of content blocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: Vec<ContentBlock>,
}

impl Message {
    /// Create a user message with a single text block
    pub fn user(text: impl Into<String>) -> Self {
        Self::with_blocks(MessageRole::User, vec![ContentBlock::text(text)])
    }

    /// Create an assistant message with a single text block
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::with_blocks(MessageRole::Assistant, vec![ContentBlock::text(text)])
    }

    /// Create a message from explicit blocks
    pub fn with_blocks(role: MessageRole, content: Vec<ContentBlock>) -> Self {
        Self { role, content }
    }

    /// Concatenated text of all text blocks, in order
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// Tool use requests carried by this message, in request order
    pub fn tool_calls(&self) -> Vec<ToolCall> {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::ToolUse { id, name, input } => {
                    Some(ToolCall::new(id.clone(), name.clone(), input.clone()))
                }
                _ => None,
            })
            .collect()
    }

    pub fn has_tool_use(&self) -> bool {
        self.content.iter().any(ContentBlock::is_tool_use)
    }

    /// Copy of this message with tool use blocks removed
    pub fn without_tool_use(&self) -> Self {
        Self {
            role: self.role,
            content: self
                .content
                .iter()
                .filter(|block| !block.is_tool_use())
                .cloned()
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_creation() {
        let user = Message::user("Hello");
        assert_eq!(user.role, MessageRole::User);
        assert_eq!(user.text(), "Hello");

        let asst = Message::assistant("Hi there!");
        assert_eq!(asst.role, MessageRole::Assistant);
        assert!(!asst.has_tool_use());
    }

    #[test]
    fn test_tool_calls_keep_request_order() {
        let msg = Message::with_blocks(
            MessageRole::Assistant,
            vec![
                ContentBlock::text("Let me check."),
                ContentBlock::tool_use("a", "read_file", json!({"path": "x"})),
                ContentBlock::tool_use("b", "list_dir", json!({})),
            ],
        );

        let calls = msg.tool_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].id, "a");
        assert_eq!(calls[1].name, "list_dir");
        assert_eq!(msg.text(), "Let me check.");
        assert_eq!(msg.without_tool_use().content.len(), 1);
    }

    #[test]
    fn test_content_block_serialization() {
        let block = ContentBlock::tool_use("t1", "echo", json!({"x": 1}));
        let json = serde_json::to_string(&block).unwrap();
        assert!(json.contains("\"type\":\"tool_use\""));

        let ok = ContentBlock::tool_result("t1", &ToolOutput::text("fine"));
        let json = serde_json::to_string(&ok).unwrap();
        assert!(!json.contains("is_error"));
    }
}
