//! Request orchestrator with tool execution.
//!
//! The orchestrator runs one user request to completion:
//! 1. Fetch the tool directory from the MCP server
//! 2. Call the gateway with the conversation and the tool schemas
//! 3. Return the answer if the model requested no tools
//! 4. Otherwise execute each requested tool call in order, appending results
//! 5. Call the gateway again without tools for the final answer
//!
//! Tool failures never abort a run; they are fed back to the model as error
//! content. Failures talking to the gateway or listing tools end the run with
//! a failed [`OrchestrationResult`].
//!
//! # Example
//!
//! ```rust,ignore
//! use litellm_mcp_agent::llm::Orchestrator;
//!
//! let orchestrator = Orchestrator::from_config(&config)?;
//! let result = orchestrator.process_request("What's the weather in Tokyo?", "gpt-3.5-turbo").await;
//! assert!(result.success);
//! ```

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::config::{AgentSettings, AppConfig};
use crate::error::{AgentError, ErrorKind, Result};
use crate::mcp::{McpToolClient, ToolCallResult, ToolDirectory, ToolServer};

use super::{ChatCompletionsDriver, Conversation, LlmDriver, LlmRequest, ModelDecision, ToolCall};

/// Outcome of one orchestration run.
#[derive(Debug, Clone, Serialize)]
pub struct OrchestrationResult {
    pub success: bool,
    /// Final answer text (empty on failure).
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    pub model: String,
    pub tool_calls_made: usize,
    /// Raw outcome of every tool call, in execution order.
    pub tool_results: Vec<ToolCallResult>,
    /// Tokens reported by the gateway, summed over all calls.
    pub total_tokens: u64,
}

impl OrchestrationResult {
    fn started(model: &str) -> Self {
        Self {
            success: false,
            response: String::new(),
            error: None,
            error_kind: None,
            model: model.to_string(),
            tool_calls_made: 0,
            tool_results: Vec::new(),
            total_tokens: 0,
        }
    }
}

/// LLM orchestrator with tool execution.
///
/// Holds no per-request state; every call to [`Self::process_request`] owns
/// its own conversation and tool directory.
#[derive(Clone)]
pub struct Orchestrator {
    driver: Arc<dyn LlmDriver>,
    tools: Arc<dyn ToolServer>,
    max_tool_rounds: u32,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("max_tool_rounds", &self.max_tool_rounds)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Create an orchestrator from explicit collaborators.
    pub fn new(
        driver: Arc<dyn LlmDriver>,
        tools: Arc<dyn ToolServer>,
        settings: &AgentSettings,
    ) -> Self {
        Self {
            driver,
            tools,
            max_tool_rounds: settings.max_tool_rounds.max(1),
        }
    }

    /// Create an orchestrator talking to the configured gateway and MCP server.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let driver = Arc::new(ChatCompletionsDriver::new(&config.gateway)?);
        let tools = Arc::new(McpToolClient::new(&config.mcp));
        Ok(Self::new(driver, tools, &config.agent))
    }

    /// Fetch and validate the current tool directory.
    pub async fn tool_directory(&self) -> Result<ToolDirectory> {
        let descriptors = self.tools.list_tools().await?;
        ToolDirectory::from_descriptors(descriptors)
    }

    /// Answer `text` with `model`, executing any tools the model asks for.
    pub async fn process_request(&self, text: &str, model: &str) -> OrchestrationResult {
        let request_id = Uuid::new_v4().to_string();
        let mut outcome = OrchestrationResult::started(model);

        tracing::info!(
            request_id = %request_id,
            model = %model,
            "Processing request"
        );

        match self.run(&request_id, text, model, &mut outcome).await {
            Ok(answer) => {
                outcome.success = true;
                outcome.response = answer;
                tracing::info!(
                    request_id = %request_id,
                    tool_calls_made = outcome.tool_results.len(),
                    total_tokens = outcome.total_tokens,
                    "Request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    request_id = %request_id,
                    error = %e,
                    "Failed to process request"
                );
                outcome.error_kind = Some(e.kind());
                outcome.error = Some(e.to_string());
            }
        }

        outcome.tool_calls_made = outcome.tool_results.len();
        outcome
    }

    async fn run(
        &self,
        request_id: &str,
        text: &str,
        model: &str,
        outcome: &mut OrchestrationResult,
    ) -> Result<String> {
        let directory = self.tool_directory().await?;
        let functions = directory.function_schemas();

        tracing::info!(
            request_id = %request_id,
            tool_count = functions.len(),
            "Converted MCP tools to function schemas"
        );

        let mut conversation = Conversation::new(text);
        let mut round: u32 = 0;

        loop {
            let offer_tools = round < self.max_tool_rounds && !directory.is_empty();

            tracing::debug!(
                request_id = %request_id,
                round = round,
                offer_tools = offer_tools,
                message_count = conversation.messages().len(),
                "Calling gateway"
            );

            let reply = self
                .driver
                .complete(LlmRequest {
                    model: model.to_string(),
                    messages: conversation.messages().to_vec(),
                    tools: if offer_tools { functions.clone() } else { Vec::new() },
                })
                .await?;

            if let Some(usage) = reply.usage {
                outcome.total_tokens += usage.total_tokens;
            }

            let calls = match reply.decision {
                ModelDecision::FinalAnswer(answer) => return Ok(answer),
                // Past the last tool round: the follow-up must carry the answer.
                ModelDecision::ToolCalls(calls) if !offer_tools && round > 0 => {
                    tracing::warn!(
                        request_id = %request_id,
                        tool_call_count = calls.len(),
                        "Model requested tools on the tool-free follow-up, ignoring"
                    );
                    return match reply.content {
                        Some(answer) if !answer.trim().is_empty() => Ok(answer),
                        _ => Err(AgentError::MalformedResponse(
                            "model requested tools after the final round and gave no answer"
                                .to_string(),
                        )),
                    };
                }
                ModelDecision::ToolCalls(calls) => calls,
            };

            tracing::info!(
                request_id = %request_id,
                round = round,
                tool_call_count = calls.len(),
                "Model requested tool calls"
            );

            conversation.push_tool_calls(reply.content, calls.clone());
            for call in &calls {
                let result = self.execute_call(request_id, &directory, call).await;
                conversation.push_tool_result(&call.id, result.message_content());
                outcome.tool_results.push(result);
            }

            round += 1;
        }
    }

    /// Execute one requested call. Never fails: problems become error results.
    async fn execute_call(
        &self,
        request_id: &str,
        directory: &ToolDirectory,
        call: &ToolCall,
    ) -> ToolCallResult {
        let name = &call.function.name;

        if !directory.contains(name) {
            tracing::warn!(
                request_id = %request_id,
                tool_name = %name,
                "Model requested unknown tool"
            );
            return ToolCallResult::failed(
                name,
                &call.id,
                serde_json::Value::String(call.function.arguments.clone()),
                format!("unknown tool: {name}"),
            );
        }

        let arguments = match call.parsed_arguments() {
            Ok(args) => args,
            Err(reason) => {
                tracing::warn!(
                    request_id = %request_id,
                    tool_name = %name,
                    error = %reason,
                    "Undecodable tool arguments"
                );
                return ToolCallResult::failed(
                    name,
                    &call.id,
                    serde_json::Value::String(call.function.arguments.clone()),
                    reason,
                );
            }
        };

        let result = self.tools.invoke(&call.id, name, arguments).await;
        tracing::info!(
            request_id = %request_id,
            tool_name = %name,
            tool_id = %call.id,
            success = result.success,
            "Tool call finished"
        );
        result
    }
}
