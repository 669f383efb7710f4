//! Model Context Protocol (MCP) client side.
//!
//! This module talks to a single MCP tool server over the streamable HTTP
//! transport: it lists the advertised tools, translates them into the
//! gateway's function-calling format, and invokes them on behalf of the model.
//!
//! # Components
//!
//! - [`ToolServer`]: the seam the orchestrator depends on
//! - [`McpToolClient`]: `rmcp`-backed implementation
//! - [`ToolDirectory`]: validated snapshot of one `tools/list` answer

pub mod client;
pub mod registry;
pub mod types;

pub use client::McpToolClient;
pub use registry::ToolDirectory;
pub use types::{ToolCallResult, ToolDescriptor};

use async_trait::async_trait;

/// A server that lists and executes tools.
#[async_trait]
pub trait ToolServer: Send + Sync {
    /// Fetch the advertised tools.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::AgentError::Connectivity`] when the server is
    /// unreachable or answers with malformed data.
    async fn list_tools(&self) -> crate::error::Result<Vec<ToolDescriptor>>;

    /// Execute a tool. Failures are reported in the returned result, never
    /// raised.
    async fn invoke(
        &self,
        call_id: &str,
        name: &str,
        arguments: serde_json::Value,
    ) -> ToolCallResult;
}
