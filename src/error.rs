//! Error types for the agent.
//!
//! Request-level failures (gateway unreachable, bad credentials, malformed
//! tool descriptors) are surfaced as [`AgentError`]. Tool execution failures
//! are not errors: they travel as [`crate::mcp::ToolCallResult`] data so the
//! model can react to them.

use serde::Serialize;
use thiserror::Error;

/// Name used for the LLM gateway in error messages and logs.
pub const GATEWAY: &str = "LLM gateway";

/// Name used for the MCP tool server in error messages and logs.
pub const TOOL_SERVER: &str = "MCP tool server";

/// Agent error type.
#[derive(Error, Debug)]
pub enum AgentError {
    /// A remote service could not be reached or misbehaved at the transport level.
    #[error("{service} unreachable: {message}")]
    Connectivity {
        /// Which collaborator failed.
        service: &'static str,
        /// Underlying cause.
        message: String,
    },

    /// The remote service rejected our credentials.
    #[error("{service} rejected credentials ({status}): {message}")]
    Authentication {
        /// Which collaborator failed.
        service: &'static str,
        /// HTTP status code.
        status: u16,
        /// Error body returned by the service.
        message: String,
    },

    /// A tool descriptor could not be translated to a function schema.
    #[error("malformed tool descriptor '{tool}': {reason}")]
    Schema {
        /// Tool name as reported by the server (may be empty).
        tool: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The gateway answered with a non-success status.
    #[error("LLM gateway returned {status}: {message}")]
    Gateway {
        /// HTTP status code.
        status: u16,
        /// Error body returned by the gateway.
        message: String,
    },

    /// The gateway answered 2xx but the body is not a usable completion.
    #[error("unexpected LLM gateway response: {0}")]
    MalformedResponse(String),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Stable classification of [`AgentError`], reported in results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Connectivity,
    Authentication,
    Schema,
    Gateway,
    MalformedResponse,
    Config,
}

impl AgentError {
    pub fn connectivity(service: &'static str, message: impl Into<String>) -> Self {
        Self::Connectivity {
            service,
            message: message.into(),
        }
    }

    pub fn schema(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Schema {
            tool: tool.into(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Connectivity { .. } => ErrorKind::Connectivity,
            Self::Authentication { .. } => ErrorKind::Authentication,
            Self::Schema { .. } => ErrorKind::Schema,
            Self::Gateway { .. } => ErrorKind::Gateway,
            Self::MalformedResponse(_) => ErrorKind::MalformedResponse,
            Self::Config(_) => ErrorKind::Config,
        }
    }
}

impl From<config::ConfigError> for AgentError {
    fn from(e: config::ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}

/// Result type alias for agent operations.
pub type Result<T> = std::result::Result<T, AgentError>;
