use serde::{Deserialize, Serialize};

/// Payload reported when a tool succeeds without returning any content.
pub const EMPTY_TOOL_OUTPUT: &str = "Tool executed successfully but returned no content";

/// A tool advertised by the MCP server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "inputSchema", default)]
    pub input_schema: serde_json::Value,
}

impl ToolDescriptor {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// Outcome of a single tool invocation.
///
/// Tool failures are data: the orchestrator feeds [`Self::message_content`]
/// back to the model whether or not the call succeeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallResult {
    /// Tool name as requested by the model.
    pub tool: String,
    /// Tool call ID this result answers.
    pub call_id: String,
    /// Arguments the tool was (or would have been) called with.
    pub arguments: serde_json::Value,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolCallResult {
    pub fn succeeded(
        tool: impl Into<String>,
        call_id: impl Into<String>,
        arguments: serde_json::Value,
        output: impl Into<String>,
    ) -> Self {
        Self {
            tool: tool.into(),
            call_id: call_id.into(),
            arguments,
            success: true,
            output: Some(output.into()),
            error: None,
        }
    }

    pub fn failed(
        tool: impl Into<String>,
        call_id: impl Into<String>,
        arguments: serde_json::Value,
        error: impl Into<String>,
    ) -> Self {
        Self {
            tool: tool.into(),
            call_id: call_id.into(),
            arguments,
            success: false,
            output: None,
            error: Some(error.into()),
        }
    }

    /// Content of the `tool` message sent back to the model.
    #[must_use]
    pub fn message_content(&self) -> String {
        let body = match (&self.output, &self.error) {
            (Some(output), None) => serde_json::json!({ "result": output }),
            (_, Some(error)) => serde_json::json!({ "error": error }),
            (None, None) => serde_json::json!({ "result": EMPTY_TOOL_OUTPUT }),
        };
        body.to_string()
    }
}

/// Extract the textual payload from a serialized MCP `CallToolResult`.
///
/// Text items are joined with newlines; without any, `structuredContent` is
/// used verbatim. Returns `(is_error, payload)`.
pub fn extract_tool_output(result: &serde_json::Value) -> (bool, String) {
    let is_error = result
        .get("isError")
        .and_then(serde_json::Value::as_bool)
        .unwrap_or(false);

    let texts: Vec<&str> = result
        .get("content")
        .and_then(serde_json::Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter(|item| item.get("type").and_then(|t| t.as_str()) == Some("text"))
                .filter_map(|item| item.get("text").and_then(|t| t.as_str()))
                .collect()
        })
        .unwrap_or_default();

    if !texts.is_empty() {
        return (is_error, texts.join("\n"));
    }

    match result.get("structuredContent") {
        Some(structured) if !structured.is_null() => (is_error, structured.to_string()),
        _ => (is_error, EMPTY_TOOL_OUTPUT.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_content_success() {
        let r = ToolCallResult::succeeded("get_weather", "call_1", json!({}), "Sunny, 22C");
        assert_eq!(r.message_content(), r#"{"result":"Sunny, 22C"}"#);
    }

    #[test]
    fn test_message_content_failure() {
        let r = ToolCallResult::failed("weather_xyz", "call_1", json!({}), "unknown tool");
        assert!(!r.success);
        assert_eq!(r.message_content(), r#"{"error":"unknown tool"}"#);
    }

    #[test]
    fn test_extract_joins_text_items() {
        let raw = json!({
            "content": [
                { "type": "text", "text": "line one" },
                { "type": "image", "data": "...", "mimeType": "image/png" },
                { "type": "text", "text": "line two" }
            ]
        });
        assert_eq!(extract_tool_output(&raw), (false, "line one\nline two".to_string()));
    }

    #[test]
    fn test_extract_structured_and_empty() {
        let raw = json!({ "content": [], "structuredContent": { "temp": 22 } });
        assert_eq!(extract_tool_output(&raw), (false, r#"{"temp":22}"#.to_string()));

        let raw = json!({ "content": [], "isError": true });
        assert_eq!(extract_tool_output(&raw), (true, EMPTY_TOOL_OUTPUT.to_string()));
    }
}
