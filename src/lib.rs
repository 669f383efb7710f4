//! LiteLLM MCP Agent
//!
//! A command-line agent that forwards natural-language requests to an
//! OpenAI-compatible LLM gateway, offers it the tools discovered on an MCP
//! server, executes the tool calls the model asks for, and relays the results
//! back for a final answer.
//!
//! # Architecture
//!
//! - **Tool directory / invoker**: MCP client over streamable HTTP
//! - **Orchestrator**: discover tools → call model → execute tools → final answer
//! - **CLI**: single-shot JSON mode and an interactive loop
//!
//! # Modules
//!
//! - [`cli`]: command-line front end
//! - [`config`]: configuration loading
//! - [`error`]: error types
//! - [`llm`]: gateway driver and request orchestrator
//! - [`mcp`]: MCP tool server client and tool directory

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::default_trait_access)]

pub mod cli;
pub mod config;
pub mod error;
pub mod llm;
pub mod mcp;

pub use config::AppConfig;
pub use error::{AgentError, ErrorKind};
pub use llm::{OrchestrationResult, Orchestrator};
