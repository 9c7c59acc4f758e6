//! Intent selection entity

use crate::tool::value_objects::ToolArguments;
use serde::{Deserialize, Serialize};

/// Reasoning recorded when selection could not be completed
pub const SELECTION_ERROR_REASONING: &str = "error in tool selection";

/// The model's decision for one user input: a tool to call, or none.
///
/// When `tool_name` is `None` the parameters are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentSelection {
    pub tool_name: Option<String>,
    #[serde(default)]
    pub parameters: ToolArguments,
    #[serde(default)]
    pub reasoning: String,
}

impl IntentSelection {
    pub fn tool(
        name: impl Into<String>,
        parameters: ToolArguments,
        reasoning: impl Into<String>,
    ) -> Self {
        Self {
            tool_name: Some(name.into()),
            parameters,
            reasoning: reasoning.into(),
        }
    }

    pub fn no_tool(reasoning: impl Into<String>) -> Self {
        Self {
            tool_name: None,
            parameters: ToolArguments::default(),
            reasoning: reasoning.into(),
        }
    }

    /// Selection used whenever the model reply cannot be read or the model fails
    pub fn selection_error() -> Self {
        Self::no_tool(SELECTION_ERROR_REASONING)
    }

    pub fn selected_tool(&self) -> Option<&str> {
        self.tool_name.as_deref()
    }

    pub fn is_tool_selected(&self) -> bool {
        self.tool_name.is_some()
    }
}
