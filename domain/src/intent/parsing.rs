//! Intent parsing from model replies.
//!
//! Models are asked to answer with a bare JSON object but often wrap it in
//! prose or code fences. The reply is read by locating the first balanced
//! `{...}` region, skipping braces that appear inside JSON strings.

use super::entities::IntentSelection;
use crate::core::error::IntentParseError;
use crate::tool::value_objects::ToolArguments;
use serde_json::Value;

/// Find the first balanced `{...}` region in `text`.
///
/// Braces inside double-quoted strings (with backslash escapes) do not count
/// toward nesting. If a `{` never closes, scanning resumes at the next `{`.
pub fn find_first_json_object(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut search_from = 0;

    while let Some(offset) = text[search_from..].find('{') {
        let start = search_from + offset;
        if let Some(end) = matching_brace(bytes, start) {
            return Some(&text[start..=end]);
        }
        search_from = start + 1;
    }

    None
}

/// Index of the `}` closing the `{` at `start`, if any.
fn matching_brace(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }

    None
}

/// Read a tool selection out of a model reply.
///
/// `toolName` values that are missing, non-string, blank or the literal
/// string `"null"` all mean "no tool". `parameters` that are not an object
/// become empty.
pub fn parse_intent_selection(reply: &str) -> Result<IntentSelection, IntentParseError> {
    let region = find_first_json_object(reply).ok_or(IntentParseError::NoJsonObject)?;
    let value: Value =
        serde_json::from_str(region).map_err(|e| IntentParseError::InvalidJson(e.to_string()))?;

    let tool_name = value.get("toolName").and_then(normalize_tool_name);
    let reasoning = value
        .get("reasoning")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Ok(match tool_name {
        Some(name) => IntentSelection::tool(
            name,
            ToolArguments::from_json(value.get("parameters")),
            reasoning,
        ),
        None => IntentSelection::no_tool(reasoning),
    })
}

fn normalize_tool_name(value: &Value) -> Option<String> {
    let name = value.as_str()?.trim();
    if name.is_empty() || name.eq_ignore_ascii_case("null") {
        None
    } else {
        Some(name.to_string())
    }
}
