//! Tool/function calling types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tool definition advertised to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    /// Tool name (function name)
    pub name: String,
    /// Description of what the tool does
    pub description: String,
    /// JSON Schema for the input parameters
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

impl Tool {
    /// Create a new tool definition with an empty object schema
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: serde_json::json!({ "type": "object" }),
        }
    }

    /// Set the input schema
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.input_schema = schema;
        self
    }
}

/// A tool as advertised by one live session
///
/// Rebuilt on every catalog refresh and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Tool name
    pub name: String,
    /// Human description
    pub description: String,
    /// JSON Schema for tool parameters
    pub input_schema: Value,
    /// Name of the session that owns this tool
    pub session: String,
}

impl ToolDescriptor {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
        session: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
            session: session.into(),
        }
    }
}

impl From<&ToolDescriptor> for Tool {
    fn from(descriptor: &ToolDescriptor) -> Self {
        Tool {
            name: descriptor.name.clone(),
            description: format!("[{}] {}", descriptor.session, descriptor.description),
            input_schema: descriptor.input_schema.clone(),
        }
    }
}

/// Tool call requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this tool call
    pub id: String,
    /// Name of the tool being called
    pub name: String,
    /// Input arguments for the tool
    pub input: Value,
}

impl ToolCall {
    /// Create a new tool call
    pub fn new(id: impl Into<String>, name: impl Into<String>, input: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            input,
        }
    }
}

/// Normalized result of one tool invocation
///
/// Both transports produce this shape: an ordered list of text segments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub segments: Vec<String>,
    #[serde(rename = "isError", default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ToolOutput {
    /// Output made of a single text segment
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            segments: vec![text.into()],
            is_error: false,
        }
    }

    pub fn from_segments(segments: Vec<String>, is_error: bool) -> Self {
        Self { segments, is_error }
    }

    /// Text content as a single string
    pub fn text_content(&self) -> String {
        self.segments.join("\n")
    }
}
