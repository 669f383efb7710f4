//! Per-request conversation buffer.

use super::{Message, ToolCall};

/// Ordered, append-only message history for one request.
///
/// A conversation lives for a single orchestration run and is dropped with
/// the result; nothing is persisted.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Start a conversation with the user's request.
    #[must_use]
    pub fn new(user_request: &str) -> Self {
        Self {
            messages: vec![Message::user(user_request)],
        }
    }

    /// Record the assistant turn that requested `calls`.
    pub fn push_tool_calls(&mut self, content: Option<String>, calls: Vec<ToolCall>) {
        self.messages
            .push(Message::assistant_tool_calls(content, calls));
    }

    /// Record the result of the tool call `call_id`.
    pub fn push_tool_result(&mut self, call_id: &str, content: String) {
        self.messages.push(Message::tool_result(call_id, content));
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

}
