//! Conversation turn entity

use crate::intent::entities::IntentSelection;
use crate::tool::value_objects::{ToolArguments, ToolInvocationResult};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Record of processing one user input, returned to the caller.
///
/// `succeeded` is false exactly when `error_message` is set. A turn that
/// used a tool carries that tool's result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationTurn {
    pub user_input: String,
    pub tool_used: Option<String>,
    pub tool_parameters: Option<ToolArguments>,
    pub tool_result: Option<ToolInvocationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_response: Option<String>,
    pub reasoning: String,
    pub succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub duration_ms: u64,
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    /// The model answered directly without a tool
    pub fn direct_reply(
        user_input: impl Into<String>,
        selection: IntentSelection,
        reply: impl Into<String>,
    ) -> Self {
        Self::base(user_input, selection.reasoning).with_response(reply)
    }

    /// A tool ran successfully and its result was composed into a reply
    pub fn tool_success(
        user_input: impl Into<String>,
        selection: IntentSelection,
        result: ToolInvocationResult,
        response: impl Into<String>,
    ) -> Self {
        let mut turn = Self::base(user_input, selection.reasoning);
        turn.tool_used = selection.tool_name;
        turn.tool_parameters = Some(selection.parameters);
        turn.tool_result = Some(result);
        turn.with_response(response)
    }

    /// A tool was selected but its invocation failed
    pub fn tool_failure(
        user_input: impl Into<String>,
        selection: IntentSelection,
        result: ToolInvocationResult,
    ) -> Self {
        let message = result
            .raw_error()
            .unwrap_or("tool invocation failed")
            .to_string();
        let mut turn = Self::base(user_input, selection.reasoning);
        turn.tool_used = selection.tool_name;
        turn.tool_parameters = Some(selection.parameters);
        turn.tool_result = Some(result);
        turn.with_error(message)
    }

    /// The turn could not be completed for a reason unrelated to a tool
    pub fn failed(
        user_input: impl Into<String>,
        reasoning: impl Into<String>,
        error_message: impl Into<String>,
    ) -> Self {
        Self::base(user_input, reasoning).with_error(error_message)
    }

    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Text to show the user: the reply, or the error for a failed turn
    pub fn display_text(&self) -> &str {
        self.final_response
            .as_deref()
            .or(self.error_message.as_deref())
            .unwrap_or_default()
    }

    fn base(user_input: impl Into<String>, reasoning: impl Into<String>) -> Self {
        Self {
            user_input: user_input.into(),
            tool_used: None,
            tool_parameters: None,
            tool_result: None,
            final_response: None,
            reasoning: reasoning.into(),
            succeeded: false,
            error_message: None,
            duration_ms: 0,
            timestamp: Utc::now(),
        }
    }

    fn with_response(mut self, response: impl Into<String>) -> Self {
        self.final_response = Some(response.into());
        self.succeeded = true;
        self.error_message = None;
        self
    }

    fn with_error(mut self, message: impl Into<String>) -> Self {
        let message = message.into();
        self.error_message = Some(if message.is_empty() {
            "request failed".to_string()
        } else {
            message
        });
        self.succeeded = false;
        self.final_response = None;
        self
    }
}
