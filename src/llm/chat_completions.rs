//! OpenAI Chat Completions API driver.
//!
//! This module implements the [`LlmDriver`] trait against an OpenAI-compatible
//! gateway (`/v1/chat/completions`), offering tools in function-calling format
//! and decoding the reply into a [`ModelDecision`].

use std::time::Duration;

use serde::Deserialize;
use uuid::Uuid;

use crate::config::GatewaySettings;
use crate::error::{AgentError, GATEWAY, Result};

use super::{LlmDriver, LlmReply, LlmRequest, ModelDecision, ToolCall, ToolCallFunction, Usage};

/// Driver for the OpenAI Chat Completions API.
#[derive(Clone)]
pub struct ChatCompletionsDriver {
    http: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl std::fmt::Debug for ChatCompletionsDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionsDriver")
            .field("url", &self.url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ChatCompletionsDriver {
    /// Create a driver for the configured gateway.
    pub fn new(settings: &GatewaySettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| AgentError::Config(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            http,
            url: format!(
                "{}/v1/chat/completions",
                settings.base_url.trim_end_matches('/')
            ),
            api_key: settings.api_key.clone().filter(|k| !k.trim().is_empty()),
        })
    }

    /// Full completions endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    fn transport_error(&self, e: &reqwest::Error) -> AgentError {
        let message = if e.is_timeout() {
            format!("request to {} timed out", self.url)
        } else {
            format!("request to {} failed: {e}", self.url)
        };
        AgentError::connectivity(GATEWAY, message)
    }
}

#[async_trait::async_trait]
impl LlmDriver for ChatCompletionsDriver {
    async fn complete(&self, req: LlmRequest) -> Result<LlmReply> {
        let mut body = serde_json::json!({
            "model": req.model,
            "messages": req.messages,
        });
        if !req.tools.is_empty() {
            body["tools"] = serde_json::json!(req.tools);
            body["tool_choice"] = serde_json::json!("auto");
        }

        tracing::info!(
            name: "llm.request",
            url = %self.url,
            model = %req.model,
            message_count = req.messages.len(),
            tool_count = req.tools.len(),
            "Calling LLM gateway"
        );
        tracing::debug!(body = %body, "LLM request body");

        let mut rb = self.http.post(&self.url).json(&body);
        if let Some(k) = &self.api_key {
            rb = rb.bearer_auth(k);
        }

        let resp = rb.send().await.map_err(|e| self.transport_error(&e))?;
        let status = resp.status();
        let text = resp.text().await.map_err(|e| self.transport_error(&e))?;

        if !status.is_success() {
            tracing::error!(name: "llm.request.failed", status = status.as_u16(), body = %text, "LLM gateway request failed");
            return Err(match status.as_u16() {
                401 | 403 => AgentError::Authentication {
                    service: GATEWAY,
                    status: status.as_u16(),
                    message: text,
                },
                code => AgentError::Gateway {
                    status: code,
                    message: text,
                },
            });
        }

        let value: serde_json::Value = serde_json::from_str(&text)
            .map_err(|e| AgentError::MalformedResponse(format!("body is not JSON: {e}")))?;
        let reply = decode_reply(value)?;

        let tool_calls = match &reply.decision {
            ModelDecision::ToolCalls(calls) => calls.len(),
            ModelDecision::FinalAnswer(_) => 0,
        };
        tracing::info!(
            name: "llm.response",
            tool_calls,
            total_tokens = reply.usage.map_or(0, |u| u.total_tokens),
            "LLM gateway request successful"
        );
        Ok(reply)
    }
}

#[derive(Debug, Deserialize)]
struct CompletionBody {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<AssistantMessage>,
}

#[derive(Debug, Default, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<WireToolCall>>,
    /// Legacy single function call.
    #[serde(default)]
    function_call: Option<ToolCallFunction>,
}

#[derive(Debug, Deserialize)]
struct WireToolCall {
    #[serde(default)]
    id: Option<String>,
    function: ToolCallFunction,
}

fn synthetic_call_id() -> String {
    format!("call_{}", Uuid::new_v4().simple())
}

/// Decode a completion body into a [`LlmReply`].
///
/// Tool calls keep the model's order. A legacy `function_call` becomes a
/// single tool call; calls without an ID get a generated one.
pub fn decode_reply(body: serde_json::Value) -> Result<LlmReply> {
    let body: CompletionBody = serde_json::from_value(body)
        .map_err(|e| AgentError::MalformedResponse(e.to_string()))?;

    let message = body
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| AgentError::MalformedResponse("no choices in completion".to_string()))?
        .message
        .unwrap_or_default();

    let mut calls: Vec<ToolCall> = message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|tc| ToolCall {
            id: tc.id.filter(|id| !id.is_empty()).unwrap_or_else(synthetic_call_id),
            call_type: "function".to_string(),
            function: tc.function,
        })
        .collect();

    if calls.is_empty() {
        if let Some(function) = message.function_call {
            calls.push(ToolCall {
                id: synthetic_call_id(),
                call_type: "function".to_string(),
                function,
            });
        }
    }

    let decision = if calls.is_empty() {
        ModelDecision::FinalAnswer(message.content.clone().unwrap_or_default())
    } else {
        ModelDecision::ToolCalls(calls)
    };

    Ok(LlmReply {
        decision,
        content: message.content,
        usage: body.usage,
    })
}
