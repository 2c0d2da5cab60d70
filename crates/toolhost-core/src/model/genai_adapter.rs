//! Adapter between toolhost message types and genai types
//!
//! Tool-use blocks become genai tool calls on the assistant side and each
//! tool-result block becomes its own genai tool response.

use std::future::Future;
use std::pin::Pin;

use genai::chat::{
    ChatMessage as GenaiMessage, ChatOptions as GenaiOptions, ChatRequest, Tool as GenaiTool,
    ToolCall as GenaiToolCall, ToolResponse as GenaiToolResponse,
};
use genai::resolver::{AuthData, AuthResolver};
use genai::{Client, ModelIden};
use serde_json::json;

use crate::types::{ContentBlock, Message, MessageRole, Tool, ToolCall};
use super::error::{ModelCallError, ModelResult};
use super::traits::ModelRequest;

// ============================================================================
// Message Conversion: toolhost -> genai
// ============================================================================

/// Build a genai tool call from a tool-use block
pub fn to_genai_tool_call(id: &str, name: &str, input: &serde_json::Value) -> ModelResult<GenaiToolCall> {
    serde_json::from_value(json!({
        "call_id": id,
        "fn_name": name,
        "fn_arguments": input,
    }))
    .map_err(|e| ModelCallError::Other(format!("cannot build tool call {}: {}", id, e)))
}

/// Convert one message into one or more genai messages
///
/// Text blocks are joined into one leading message. Assistant tool uses are grouped into one
/// tool-call message; every tool result becomes its own tool response.
pub fn to_genai_message(msg: &Message) -> ModelResult<Vec<GenaiMessage>> {
    let mut out = Vec::new();
    let mut text = String::new();
    let mut calls = Vec::new();

    for block in &msg.content {
        match block {
            ContentBlock::Text { text: t } => text.push_str(t),
            ContentBlock::ToolUse { id, name, input } => calls.push(to_genai_tool_call(id, name, input)?),
            ContentBlock::ToolResult { tool_use_id, content, is_error } => {
                let content = if *is_error {
                    format!("Error: {}", content)
                } else {
                    content.clone()
                };
                out.push(GenaiMessage::from(GenaiToolResponse::new(tool_use_id.clone(), content)));
            }
        }
    }

    if !text.is_empty() {
        let message = match msg.role {
            MessageRole::User => GenaiMessage::user(text),
            MessageRole::Assistant => GenaiMessage::assistant(text),
        };
        out.insert(0, message);
    }
    if !calls.is_empty() {
        out.push(GenaiMessage::from(calls));
    }

    Ok(out)
}

/// Convert a conversation to genai messages
pub fn to_genai_messages(messages: &[Message]) -> ModelResult<Vec<GenaiMessage>> {
    let mut out = Vec::with_capacity(messages.len());
    for message in messages {
        out.extend(to_genai_message(message)?);
    }
    Ok(out)
}

// ============================================================================
// Tool Conversion: toolhost -> genai
// ============================================================================

/// Convert toolhost Tool to genai Tool
pub fn to_genai_tool(tool: &Tool) -> GenaiTool {
    GenaiTool::new(&tool.name)
        .with_description(&tool.description)
        .with_schema(tool.input_schema.clone())
}

/// Convert toolhost tools to genai tools
pub fn to_genai_tools(tools: &[Tool]) -> Vec<GenaiTool> {
    tools.iter().map(to_genai_tool).collect()
}

/// Build the genai request for one model call
pub fn to_genai_request(request: &ModelRequest) -> ModelResult<ChatRequest> {
    let mut chat_req = ChatRequest::new(to_genai_messages(&request.messages)?);

    if !request.system.is_empty() {
        chat_req = chat_req.with_system(request.system.clone());
    }
    if !request.tools.is_empty() {
        chat_req = chat_req.with_tools(to_genai_tools(&request.tools));
    }

    Ok(chat_req)
}

/// Convert request limits to genai ChatOptions
pub fn to_genai_options(request: &ModelRequest) -> GenaiOptions {
    let mut genai_opts = GenaiOptions::default();

    if let Some(max_tokens) = request.max_tokens {
        genai_opts = genai_opts.with_max_tokens(max_tokens);
    }

    // Capture tool calls in stream so we can return them
    genai_opts.with_capture_tool_calls(true)
}

// ============================================================================
// Response Conversion: genai -> toolhost
// ============================================================================

/// Convert genai ToolCall to toolhost ToolCall
pub fn from_genai_tool_call(tc: &GenaiToolCall) -> ToolCall {
    ToolCall::new(tc.call_id.clone(), tc.fn_name.clone(), tc.fn_arguments.clone())
}

/// Assemble the assistant message from streamed text and captured tool calls
pub fn assistant_message(text: String, tool_calls: Vec<ToolCall>) -> Message {
    let mut content = Vec::with_capacity(tool_calls.len() + 1);
    if !text.is_empty() {
        content.push(ContentBlock::text(text));
    }
    content.extend(
        tool_calls
            .into_iter()
            .map(|call| ContentBlock::tool_use(call.id, call.name, call.input)),
    );
    Message::with_blocks(MessageRole::Assistant, content)
}

// ============================================================================
// Client Creation
// ============================================================================

/// Create a genai Client
///
/// With an explicit key every adapter authenticates with it; otherwise
/// genai resolves keys from its usual environment variables
/// (`ANTHROPIC_API_KEY`, `OPENAI_API_KEY`, ...).
pub fn create_client(api_key: Option<String>) -> Client {
    let Some(key) = api_key else {
        return Client::default();
    };

    let auth_resolver = AuthResolver::from_resolver_async_fn(
        move |_model_iden: ModelIden| -> Pin<Box<dyn Future<Output = genai::resolver::Result<Option<AuthData>>> + Send>> {
            let key = key.clone();
            Box::pin(async move { Ok(Some(AuthData::from_single(key))) })
        },
    );

    Client::builder().with_auth_resolver(auth_resolver).build()
}

/// Strip a provider prefix ("anthropic/claude-3-5-haiku-latest" -> "claude-3-5-haiku-latest")
pub fn extract_model_name(model: &str) -> &str {
    model.split_once('/').map(|(_, name)| name).unwrap_or(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use genai::chat::ChatRole as GenaiRole;
    use crate::types::ToolOutput;

    #[test]
    fn test_message_conversion() {
        let msg = Message::user("Hello, world!");
        let genai_msgs = to_genai_message(&msg).unwrap();
        assert_eq!(genai_msgs.len(), 1);
        assert!(matches!(genai_msgs[0].role, GenaiRole::User));
    }

    #[test]
    fn test_tool_use_and_results_conversion() {
        let answer = Message::with_blocks(
            MessageRole::Assistant,
            vec![
                ContentBlock::text("Let me check."),
                ContentBlock::tool_use("call_1", "echo", json!({"x": 1})),
                ContentBlock::tool_use("call_2", "now", json!({})),
            ],
        );
        let results = Message::with_blocks(
            MessageRole::User,
            vec![
                ContentBlock::tool_result("call_1", &ToolOutput::text("1")),
                ContentBlock::tool_error("call_2", "clock offline"),
            ],
        );

        let genai_msgs = to_genai_messages(&[answer, results]).unwrap();
        // assistant text, tool calls, two tool responses
        assert_eq!(genai_msgs.len(), 4);
        assert!(matches!(genai_msgs[0].role, GenaiRole::Assistant));
        assert!(matches!(genai_msgs[1].role, GenaiRole::Assistant));
        assert!(matches!(genai_msgs[2].role, GenaiRole::Tool));
        assert!(matches!(genai_msgs[3].role, GenaiRole::Tool));
    }

    #[test]
    fn test_tool_call_round_trip() {
        let call = to_genai_tool_call("call_9", "echo", &json!({"text": "hi"})).unwrap();
        let back = from_genai_tool_call(&call);
        assert_eq!(back, ToolCall::new("call_9", "echo", json!({"text": "hi"})));
    }

    #[test]
    fn test_tool_conversion() {
        let tool = Tool::new("get_weather", "[weather] Get weather for a location")
            .with_schema(json!({
                "type": "object",
                "properties": {
                    "location": { "type": "string" }
                }
            }));

        let genai_tool = to_genai_tool(&tool);
        assert_eq!(genai_tool.name, "get_weather");
    }

    #[test]
    fn test_assistant_message_orders_text_first() {
        let msg = assistant_message(
            "On it".to_string(),
            vec![ToolCall::new("c1", "echo", json!({}))],
        );
        assert_eq!(msg.text(), "On it");
        assert_eq!(msg.tool_calls().len(), 1);
        assert!(!msg.content[0].is_tool_use());
    }

    #[test]
    fn test_extract_model_name() {
        assert_eq!(extract_model_name("anthropic/claude-3-5-haiku-latest"), "claude-3-5-haiku-latest");
        assert_eq!(extract_model_name("gpt-4o"), "gpt-4o");
    }
}
