//! Prompt templates for the concierge flow

use crate::intent::entities::IntentSelection;
use crate::tool::catalog::ToolCatalog;
use crate::tool::value_objects::ToolInvocationResult;
use serde_json::{Value, json};

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

impl PromptTemplate {
    /// Prompt asking the model to pick a tool for `user_input` and answer as JSON.
    pub fn intent_selection(catalog: &ToolCatalog, user_input: &str) -> String {
        let tools: Vec<Value> = catalog
            .all()
            .iter()
            .map(|tool| {
                json!({
                    "name": tool.name,
                    "description": tool.description,
                    "parameters": tool.prompt_parameters(),
                })
            })
            .collect();
        let tools_json =
            serde_json::to_string_pretty(&tools).unwrap_or_else(|_| "[]".to_string());

        format!(
            r#"You are an assistant that decides which tool, if any, should handle a user's request.

Available tools:
{tools_json}

User input: "{user_input}"

Work out:
1. Which tool (if any) should be used
2. Which parameters to pass to it. Use an empty object {{}} when none are needed.
3. Why you chose it

Respond with a single JSON object in exactly this format:
{{
  "toolName": "tool_name_or_null",
  "parameters": {{}},
  "reasoning": "explanation of your choice"
}}

Rules:
- If no tool is needed, set "toolName" to null and "parameters" to {{}}.
- Only choose tools from the list above.
- Parameters must match the tool's input schema.
- Use precise JSON types for parameters (numbers, strings, booleans).

Examples:
- User: "Retrieve all customers"
  Response: {{ "toolName": "get_customers", "parameters": {{}}, "reasoning": "No filter." }}

- User: "Find products with price between 10 and 50"
  Response: {{ "toolName": "get_products",
              "parameters": {{ "min_price": 10, "max_price": 50 }},
              "reasoning": "Price range filter." }}

- User: "Hello there"
  Response: {{ "toolName": null, "parameters": {{}}, "reasoning": "A greeting needs no tool." }}
"#
        )
    }

    /// Prompt asking the model to turn a tool result into a reply for the user.
    pub fn response_composition(
        user_input: &str,
        selection: &IntentSelection,
        result: &ToolInvocationResult,
    ) -> String {
        let tool_name = selection.selected_tool().unwrap_or(result.tool_name());
        format!(
            r#"You are a helpful assistant. A user asked: "{user_input}"

You used the tool "{tool_name}" because: "{reasoning}"

The tool returned:
{result_json}

Write a natural, conversational reply that:
1. Answers the user's original question
2. Works the tool's result in naturally
3. Is helpful and easy to follow
4. Leaves out technical details unless they matter

Keep the response concise but complete.
"#,
            reasoning = selection.reasoning,
            result_json = result.to_pretty_json(),
        )
    }

    /// Prompt used when no tool was selected: the user's words, unchanged
    pub fn direct_reply(user_input: &str) -> String {
        user_input.to_string()
    }
}
