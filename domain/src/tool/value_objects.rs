//! Tool value objects: argument values and invocation results

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

use crate::core::error::DomainError;

/// A single argument value passed to a tool.
///
/// Mirrors the JSON value space so arguments survive the trip from the
/// model's reply to the tool server without loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgumentValue {
    Null,
    Boolean(bool),
    Number(Number),
    String(String),
    Array(Vec<ArgumentValue>),
    Object(BTreeMap<String, ArgumentValue>),
}

impl ArgumentValue {
    /// JSON type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            ArgumentValue::Null => "null",
            ArgumentValue::Boolean(_) => "boolean",
            ArgumentValue::Number(_) => "number",
            ArgumentValue::String(_) => "string",
            ArgumentValue::Array(_) => "array",
            ArgumentValue::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ArgumentValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgumentValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ArgumentValue::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ArgumentValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Whether this is a number without a fractional part
    pub fn is_integer(&self) -> bool {
        match self {
            ArgumentValue::Number(n) => {
                n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
            }
            _ => false,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            ArgumentValue::Null => Value::Null,
            ArgumentValue::Boolean(b) => Value::Bool(*b),
            ArgumentValue::Number(n) => Value::Number(n.clone()),
            ArgumentValue::String(s) => Value::String(s.clone()),
            ArgumentValue::Array(items) => {
                Value::Array(items.iter().map(ArgumentValue::to_json).collect())
            }
            ArgumentValue::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for ArgumentValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => ArgumentValue::Null,
            Value::Bool(b) => ArgumentValue::Boolean(b),
            Value::Number(n) => ArgumentValue::Number(n),
            Value::String(s) => ArgumentValue::String(s),
            Value::Array(items) => {
                ArgumentValue::Array(items.into_iter().map(ArgumentValue::from).collect())
            }
            Value::Object(fields) => ArgumentValue::Object(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, ArgumentValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for ArgumentValue {
    fn from(value: &str) -> Self {
        ArgumentValue::String(value.to_string())
    }
}

impl From<String> for ArgumentValue {
    fn from(value: String) -> Self {
        ArgumentValue::String(value)
    }
}

impl From<bool> for ArgumentValue {
    fn from(value: bool) -> Self {
        ArgumentValue::Boolean(value)
    }
}

impl From<i64> for ArgumentValue {
    fn from(value: i64) -> Self {
        ArgumentValue::Number(Number::from(value))
    }
}

impl From<f64> for ArgumentValue {
    fn from(value: f64) -> Self {
        Number::from_f64(value)
            .map(ArgumentValue::Number)
            .unwrap_or(ArgumentValue::Null)
    }
}

/// Named arguments for one tool invocation.
///
/// Always a mapping; anything else the model produces becomes an empty set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolArguments(BTreeMap<String, ArgumentValue>);

impl ToolArguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build arguments from an optional JSON value, coercing non-objects to empty.
    pub fn from_json(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Object(fields)) => Self(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), ArgumentValue::from(v.clone())))
                    .collect(),
            ),
            _ => Self::default(),
        }
    }

    /// Parse user-typed JSON such as `{"min_price": 10}`.
    ///
    /// Empty input yields empty arguments. Unlike [`ToolArguments::from_json`]
    /// this rejects non-object JSON, since the user asked for it explicitly.
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }
        let value: Value = serde_json::from_str(trimmed)
            .map_err(|e| DomainError::InvalidArguments(e.to_string()))?;
        if !value.is_object() {
            return Err(DomainError::ArgumentsNotAnObject(value.to_string()));
        }
        Ok(Self::from_json(Some(&value)))
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<ArgumentValue>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ArgumentValue>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&ArgumentValue> {
        self.0.get(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgumentValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_json_map(&self) -> Map<String, Value> {
        self.0
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect()
    }

    pub fn to_json(&self) -> Value {
        Value::Object(self.to_json_map())
    }
}

/// One content block returned by a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    /// Content type ("text", "image", "resource", ...)
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl ContentItem {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: "text".to_string(),
            text: Some(text.into()),
        }
    }

    pub fn other(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            text: None,
        }
    }

    pub fn is_text(&self) -> bool {
        self.kind == "text" && self.text.is_some()
    }
}

/// Outcome of a tool invocation.
///
/// Built only through [`ToolInvocationResult::success`] or
/// [`ToolInvocationResult::failure`], so a failed result always carries a
/// message and a successful one never does.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolInvocationResult {
    tool_name: String,
    succeeded: bool,
    content: Vec<ContentItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    structured_content: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    raw_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_ms: Option<u64>,
}

impl ToolInvocationResult {
    pub fn success(tool_name: impl Into<String>, content: Vec<ContentItem>) -> Self {
        Self {
            tool_name: tool_name.into(),
            succeeded: true,
            content,
            structured_content: None,
            raw_error: None,
            duration_ms: None,
        }
    }

    pub fn failure(tool_name: impl Into<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            "tool invocation failed".to_string()
        } else {
            message
        };
        Self {
            tool_name: tool_name.into(),
            succeeded: false,
            content: Vec::new(),
            structured_content: None,
            raw_error: Some(message),
            duration_ms: None,
        }
    }

    pub fn with_structured_content(mut self, value: Value) -> Self {
        self.structured_content = Some(value);
        self
    }

    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn tool_name(&self) -> &str {
        &self.tool_name
    }

    pub fn succeeded(&self) -> bool {
        self.succeeded
    }

    pub fn content(&self) -> &[ContentItem] {
        &self.content
    }

    pub fn structured_content(&self) -> Option<&Value> {
        self.structured_content.as_ref()
    }

    pub fn raw_error(&self) -> Option<&str> {
        self.raw_error.as_deref()
    }

    pub fn duration_ms(&self) -> Option<u64> {
        self.duration_ms
    }

    /// Text of the first textual content item
    pub fn first_text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|item| item.is_text())
            .and_then(|item| item.text.as_deref())
    }

    /// All textual content joined by newlines
    pub fn joined_text(&self) -> String {
        self.content
            .iter()
            .filter_map(|item| item.text.as_deref())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| format!("{:?}", self))
    }

    /// Deterministic rendering used when the language model is unavailable:
    /// the first textual content item, otherwise the whole result as JSON.
    pub fn fallback_text(&self) -> String {
        match self.first_text() {
            Some(text) => text.to_string(),
            None => self.to_pretty_json(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_coerces_non_objects() {
        assert!(ToolArguments::from_json(None).is_empty());
        assert!(ToolArguments::from_json(Some(&json!(null))).is_empty());
        assert!(ToolArguments::from_json(Some(&json!([1, 2]))).is_empty());
        assert!(ToolArguments::from_json(Some(&json!("min_price=10"))).is_empty());
    }

    #[test]
    fn test_from_json_keeps_nested_values() {
        let args = ToolArguments::from_json(Some(&json!({
            "min_price": 10,
            "filter": {"tags": ["a", "b"], "active": true},
            "note": null
        })));

        assert_eq!(args.len(), 3);
        assert_eq!(args.get("min_price").and_then(ArgumentValue::as_f64), Some(10.0));
        assert!(args.get("note").unwrap().is_null());
        assert_eq!(
            args.to_json(),
            json!({"min_price": 10, "filter": {"tags": ["a", "b"], "active": true}, "note": null})
        );
    }

    #[test]
    fn test_parse_user_arguments() {
        let args = ToolArguments::parse(r#"{"max_price": 50}"#).unwrap();
        assert!(args.contains_key("max_price"));
        assert!(ToolArguments::parse("   ").unwrap().is_empty());
        assert!(matches!(
            ToolArguments::parse("[1]"),
            Err(DomainError::ArgumentsNotAnObject(_))
        ));
        assert!(matches!(
            ToolArguments::parse("{oops"),
            Err(DomainError::InvalidArguments(_))
        ));
    }

    #[test]
    fn test_integer_detection() {
        assert!(ArgumentValue::from(3i64).is_integer());
        assert!(ArgumentValue::from(3.0).is_integer());
        assert!(!ArgumentValue::from(3.5).is_integer());
        assert!(!ArgumentValue::from("3").is_integer());
    }

    #[test]
    fn test_failure_always_has_message() {
        let result = ToolInvocationResult::failure("get_orders", "");
        assert!(!result.succeeded());
        assert_eq!(result.raw_error(), Some("tool invocation failed"));

        let result = ToolInvocationResult::failure("get_orders", "connection reset");
        assert_eq!(result.raw_error(), Some("connection reset"));
    }

    #[test]
    fn test_fallback_text_uses_first_text_item() {
        let result = ToolInvocationResult::success(
            "get_customers",
            vec![
                ContentItem::other("image"),
                ContentItem::text("3 customers"),
                ContentItem::text("ignored"),
            ],
        );
        assert_eq!(result.fallback_text(), "3 customers");
        assert_eq!(result.joined_text(), "3 customers\nignored");
    }

    #[test]
    fn test_fallback_text_without_text_is_json() {
        let result =
            ToolInvocationResult::success("get_customers", vec![ContentItem::other("image")]);
        let rendered = result.fallback_text();
        let parsed: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed["toolName"], "get_customers");
        assert_eq!(parsed["succeeded"], true);
        assert_eq!(parsed["content"][0]["type"], "image");
    }
}
