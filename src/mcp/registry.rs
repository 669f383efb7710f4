use crate::error::{AgentError, Result};
use crate::llm::FunctionTool;
use crate::mcp::types::ToolDescriptor;
use std::collections::HashSet;

/// Snapshot of the tools advertised by the MCP server for one request.
///
/// Built once per orchestration run from the descriptors returned by
/// `tools/list`; names are unique and every schema is an object schema.
#[derive(Debug, Clone, Default)]
pub struct ToolDirectory {
    tools: Vec<ToolDescriptor>,
}

impl ToolDirectory {
    /// Validate and de-duplicate fetched descriptors.
    ///
    /// An empty name or a non-object input schema fails the whole directory.
    /// Repeated names keep their first occurrence.
    pub fn from_descriptors(descriptors: Vec<ToolDescriptor>) -> Result<Self> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut tools = Vec::with_capacity(descriptors.len());

        for mut tool in descriptors {
            if tool.name.trim().is_empty() {
                return Err(AgentError::schema(&tool.name, "tool name is empty"));
            }
            tool.input_schema = Self::normalize_schema(&tool.name, tool.input_schema)?;

            if !seen.insert(tool.name.clone()) {
                tracing::warn!(
                    name: "mcp.tool.duplicate",
                    tool = %tool.name,
                    "Duplicate tool name from MCP server, keeping first"
                );
                continue;
            }
            tools.push(tool);
        }

        Ok(Self { tools })
    }

    fn normalize_schema(tool: &str, schema: serde_json::Value) -> Result<serde_json::Value> {
        match schema {
            serde_json::Value::Null => Ok(Self::empty_schema()),
            serde_json::Value::Object(obj) if obj.is_empty() => Ok(Self::empty_schema()),
            serde_json::Value::Object(obj) => match obj.get("type") {
                None => Ok(serde_json::Value::Object(obj)),
                Some(t) if t.as_str() == Some("object") => Ok(serde_json::Value::Object(obj)),
                Some(t) => Err(AgentError::schema(
                    tool,
                    format!("input schema type must be \"object\", got {t}"),
                )),
            },
            other => Err(AgentError::schema(
                tool,
                format!("input schema must be a JSON object, got {other}"),
            )),
        }
    }

    fn empty_schema() -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    pub fn tools(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.iter().find(|t| t.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Tools in the gateway's function-calling format, one entry per name.
    pub fn function_schemas(&self) -> Vec<FunctionTool> {
        self.tools
            .iter()
            .map(|t| FunctionTool::new(&t.name, &t.description, t.input_schema.clone()))
            .collect()
    }
}
