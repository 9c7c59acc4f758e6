//! Output formatter trait

use concierge_domain::{ConversationTurn, SessionStatus, ToolDescriptor, ToolInvocationResult};

/// Renders what the orchestrator returns for the terminal
pub trait OutputFormatter: Send + Sync {
    /// A finished turn
    fn format_turn(&self, turn: &ConversationTurn) -> String;

    /// The tool catalog
    fn format_tools(&self, tools: &[ToolDescriptor]) -> String;

    /// The result of a direct tool call
    fn format_tool_result(&self, result: &ToolInvocationResult) -> String;

    fn format_status(&self, status: &SessionStatus) -> String;
}
