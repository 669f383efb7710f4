//! LLM gateway types and drivers.
//!
//! This module models the OpenAI-compatible Chat Completions exchange with the
//! gateway (LiteLLM or any compatible proxy) and the request orchestrator that
//! runs the tool loop on top of it.
//!
//! # Overview
//!
//! The [`LlmDriver`] trait is the single seam to the gateway: one
//! non-streaming completion per call. [`ChatCompletionsDriver`] implements it
//! over HTTP. The [`Orchestrator`] combines a driver with a
//! [`crate::mcp::ToolServer`] to answer one user request.
//!
//! # Example
//!
//! ```rust,ignore
//! use litellm_mcp_agent::{config::AppConfig, llm::Orchestrator};
//!
//! let orchestrator = Orchestrator::from_config(&config)?;
//! let result = orchestrator.process_request("What's the weather in Tokyo?", "gpt-4").await;
//! println!("{}", result.response);
//! ```

pub mod chat_completions;
pub mod conversation;
pub mod orchestrator;
pub mod provider;

pub use chat_completions::ChatCompletionsDriver;
pub use conversation::Conversation;
pub use orchestrator::{OrchestrationResult, Orchestrator};
pub use provider::Provider;

use serde::{Deserialize, Serialize};

/// A message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message author.
    pub role: MessageRole,
    /// Text content; `None` for assistant messages that only carry tool calls.
    #[serde(default)]
    pub content: Option<String>,
    /// Tool call ID (for tool responses).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// Tool calls made by the assistant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
}

impl Message {
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: Some(text.into()),
            tool_call_id: None,
            tool_calls: None,
        }
    }

    #[must_use]
    pub fn assistant_tool_calls(content: Option<String>, calls: Vec<ToolCall>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content,
            tool_call_id: None,
            tool_calls: Some(calls),
        }
    }

    #[must_use]
    pub fn tool_result(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Tool,
            content: Some(content.into()),
            tool_call_id: Some(call_id.into()),
            tool_calls: None,
        }
    }
}

/// Role of a message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// User message.
    User,
    /// Assistant response.
    Assistant,
    /// Tool response.
    Tool,
}

/// A tool call requested by the assistant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this tool call.
    pub id: String,
    /// Type of tool (always "function" for now).
    #[serde(rename = "type", default = "function_type")]
    pub call_type: String,
    /// Function details.
    pub function: ToolCallFunction,
}

fn function_type() -> String {
    "function".to_string()
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            call_type: function_type(),
            function: ToolCallFunction {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }

    /// Decode the JSON argument string into an object.
    ///
    /// Blank and `null` arguments mean "no arguments".
    pub fn parsed_arguments(&self) -> Result<serde_json::Value, String> {
        let raw = self.function.arguments.trim();
        if raw.is_empty() {
            return Ok(serde_json::Value::Object(serde_json::Map::new()));
        }
        match serde_json::from_str::<serde_json::Value>(raw) {
            Ok(serde_json::Value::Null) => Ok(serde_json::Value::Object(serde_json::Map::new())),
            Ok(v @ serde_json::Value::Object(_)) => Ok(v),
            Ok(other) => Err(format!("tool arguments must be a JSON object, got {other}")),
            Err(e) => Err(format!("tool arguments are not valid JSON: {e}")),
        }
    }
}

/// Function details in a tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallFunction {
    /// Function name.
    pub name: String,
    /// Arguments as JSON string.
    #[serde(default)]
    pub arguments: String,
}

/// A tool offered to the model, in function-calling format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionTool {
    #[serde(rename = "type")]
    pub tool_type: String,
    pub function: FunctionDefinition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

impl FunctionTool {
    pub fn new(name: &str, description: &str, parameters: serde_json::Value) -> Self {
        Self {
            tool_type: function_type(),
            function: FunctionDefinition {
                name: name.to_string(),
                description: description.to_string(),
                parameters,
            },
        }
    }
}

/// Request to an LLM driver.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    /// Model identifier forwarded to the gateway.
    pub model: String,
    /// Conversation messages.
    pub messages: Vec<Message>,
    /// Offered tools; empty means no tools.
    pub tools: Vec<FunctionTool>,
}

/// Token accounting reported by the gateway.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

/// What the model decided to do with its turn.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelDecision {
    /// A natural-language answer.
    FinalAnswer(String),
    /// One or more tool invocations, in the order the model listed them.
    ToolCalls(Vec<ToolCall>),
}

/// A decoded gateway reply.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmReply {
    pub decision: ModelDecision,
    /// Assistant text accompanying the decision (may be present with tool calls).
    pub content: Option<String>,
    pub usage: Option<Usage>,
}

/// Trait for LLM gateway drivers.
#[async_trait::async_trait]
pub trait LlmDriver: Send + Sync {
    /// Run one chat completion.
    ///
    /// # Errors
    ///
    /// Returns an error if the gateway is unreachable, rejects the request, or
    /// answers with an undecodable body.
    async fn complete(&self, req: LlmRequest) -> crate::error::Result<LlmReply>;
}
