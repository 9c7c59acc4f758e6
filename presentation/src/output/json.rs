//! JSON output for scripting

use crate::output::formatter::OutputFormatter;
use concierge_domain::{ConversationTurn, SessionStatus, ToolDescriptor, ToolInvocationResult};
use serde::Serialize;

/// Pretty-printed JSON documents, one per call
pub struct JsonFormatter;

impl JsonFormatter {
    fn render<T: Serialize + ?Sized>(value: &T) -> String {
        serde_json::to_string_pretty(value)
            .unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() }).to_string())
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_turn(&self, turn: &ConversationTurn) -> String {
        Self::render(turn)
    }

    fn format_tools(&self, tools: &[ToolDescriptor]) -> String {
        Self::render(tools)
    }

    fn format_tool_result(&self, result: &ToolInvocationResult) -> String {
        Self::render(result)
    }

    fn format_status(&self, status: &SessionStatus) -> String {
        Self::render(status)
    }
}
