use crate::config::McpSettings;
use crate::error::{AgentError, Result, TOOL_SERVER};
use crate::mcp::ToolServer;
use crate::mcp::types::{ToolCallResult, ToolDescriptor, extract_tool_output};
use async_trait::async_trait;
use rmcp::{
    model::{CallToolRequestParam, Tool},
    service::{RoleClient, RunningService, ServiceExt},
    transport::StreamableHttpClientTransport,
};
use std::future::Future;
use std::time::Duration;

type ClientService = RunningService<RoleClient, ()>;

/// MCP client for a single streamable-HTTP tool server.
///
/// Every operation opens its own session (initialize, request, close), so
/// nothing is cached between requests.
#[derive(Debug, Clone)]
pub struct McpToolClient {
    url: String,
    timeout: Duration,
}

impl McpToolClient {
    pub fn new(settings: &McpSettings) -> Self {
        Self {
            url: settings.server_url.clone(),
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }

    /// Bound a session operation by the configured timeout.
    async fn bounded<T, E, F>(&self, what: &str, fut: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, E>>,
        E: std::fmt::Display,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(v)) => Ok(v),
            Ok(Err(e)) => Err(AgentError::connectivity(
                TOOL_SERVER,
                format!("{what} failed for {}: {e}", self.url),
            )),
            Err(_) => Err(AgentError::connectivity(
                TOOL_SERVER,
                format!("{what} timed out after {}s for {}", self.timeout.as_secs(), self.url),
            )),
        }
    }

    async fn connect(&self) -> Result<ClientService> {
        tracing::debug!(name: "mcp.session.connect", url = %self.url, "Opening MCP session");
        let transport = StreamableHttpClientTransport::from_uri(self.url.clone());
        self.bounded("initialize", ().serve(transport)).await
    }

    async fn close(service: ClientService) {
        if let Err(e) = service.cancel().await {
            tracing::debug!(name: "mcp.session.close", error = %e, "MCP session did not shut down cleanly");
        }
    }

    fn descriptor(tool: &Tool) -> ToolDescriptor {
        let schema = serde_json::to_value(&*tool.input_schema)
            .unwrap_or(serde_json::Value::Null);
        ToolDescriptor::new(
            tool.name.to_string(),
            tool.description.as_deref().unwrap_or(""),
            schema,
        )
    }

    async fn call(
        &self,
        name: &str,
        arguments: &serde_json::Value,
    ) -> Result<serde_json::Value> {
        let service = self.connect().await?;
        let res = self
            .bounded(
                "tools/call",
                service.call_tool(CallToolRequestParam {
                    name: name.to_string().into(),
                    arguments: arguments.as_object().cloned(),
                }),
            )
            .await;
        Self::close(service).await;

        let res = res?;
        serde_json::to_value(res).map_err(|e| {
            AgentError::connectivity(TOOL_SERVER, format!("undecodable tools/call result: {e}"))
        })
    }
}

#[async_trait]
impl ToolServer for McpToolClient {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>> {
        let service = self.connect().await?;
        let res = self
            .bounded("tools/list", service.list_tools(Default::default()))
            .await;
        Self::close(service).await;

        let res = res?;
        if res.next_cursor.is_some() {
            tracing::warn!(
                name: "mcp.tools.paginated",
                url = %self.url,
                "MCP server paginated tools/list; only the first page is used"
            );
        }

        let tools: Vec<ToolDescriptor> = res.tools.iter().map(Self::descriptor).collect();
        for t in &tools {
            tracing::debug!(name: "mcp.tool.discovered", tool = %t.name, description = %t.description, "MCP tool discovered");
        }
        tracing::info!(name: "mcp.tools.listed", url = %self.url, tool_count = tools.len(), "Fetched MCP tools");
        Ok(tools)
    }

    async fn invoke(
        &self,
        call_id: &str,
        name: &str,
        arguments: serde_json::Value,
    ) -> ToolCallResult {
        tracing::info!(name: "mcp.tool.invoke", tool = %name, call_id = %call_id, "Executing MCP tool");
        tracing::debug!(tool = %name, arguments = %arguments, "MCP tool arguments");

        match self.call(name, &arguments).await {
            Ok(raw) => {
                let (is_error, payload) = extract_tool_output(&raw);
                if is_error {
                    tracing::warn!(name: "mcp.tool.error", tool = %name, error = %payload, "MCP tool reported an error");
                    ToolCallResult::failed(name, call_id, arguments, payload)
                } else {
                    tracing::debug!(tool = %name, result = %payload, "MCP tool result");
                    ToolCallResult::succeeded(name, call_id, arguments, payload)
                }
            }
            Err(e) => {
                tracing::error!(name: "mcp.tool.failed", tool = %name, error = %e, "Failed to execute MCP tool");
                ToolCallResult::failed(name, call_id, arguments, format!("Tool execution failed: {e}"))
            }
        }
    }
}
