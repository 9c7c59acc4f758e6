//! Tool domain entities

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Declared JSON Schema type of a tool parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
    /// The schema did not declare a type we understand; any value is accepted
    Unknown,
}

impl ParameterType {
    pub fn as_str(&self) -> &str {
        match self {
            ParameterType::String => "string",
            ParameterType::Number => "number",
            ParameterType::Integer => "integer",
            ParameterType::Boolean => "boolean",
            ParameterType::Array => "array",
            ParameterType::Object => "object",
            ParameterType::Unknown => "unknown",
        }
    }

    /// Read the `type` keyword of a JSON Schema property.
    ///
    /// Union types such as `["string", "null"]` resolve to their first
    /// non-null member.
    pub fn from_schema(value: Option<&Value>) -> Self {
        match value {
            Some(Value::String(s)) => Self::from_name(s),
            Some(Value::Array(types)) => types
                .iter()
                .filter_map(Value::as_str)
                .find(|t| *t != "null")
                .map(Self::from_name)
                .unwrap_or(ParameterType::Unknown),
            _ => ParameterType::Unknown,
        }
    }

    fn from_name(name: &str) -> Self {
        match name {
            "string" => ParameterType::String,
            "number" => ParameterType::Number,
            "integer" => ParameterType::Integer,
            "boolean" => ParameterType::Boolean,
            "array" => ParameterType::Array,
            "object" => ParameterType::Object,
            _ => ParameterType::Unknown,
        }
    }
}

impl std::fmt::Display for ParameterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Value constraints declared on a parameter (`enum`, `minimum`, `maximum`, `default`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterConstraints {
    #[serde(default, rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub allowed_values: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl ParameterConstraints {
    pub fn is_empty(&self) -> bool {
        self.allowed_values.is_empty()
            && self.minimum.is_none()
            && self.maximum.is_none()
            && self.default.is_none()
    }
}

/// Parameter specification for a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Declared type
    #[serde(rename = "type")]
    pub param_type: ParameterType,
    /// Whether the tool server requires this parameter
    pub required: bool,
    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "ParameterConstraints::is_empty")]
    pub constraints: ParameterConstraints,
}

impl ParameterSpec {
    pub fn new(param_type: ParameterType, required: bool) -> Self {
        Self {
            param_type,
            required,
            description: None,
            constraints: ParameterConstraints::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_allowed_values(mut self, values: Vec<Value>) -> Self {
        self.constraints.allowed_values = values;
        self
    }

    pub fn with_range(mut self, minimum: Option<f64>, maximum: Option<f64>) -> Self {
        self.constraints.minimum = minimum;
        self.constraints.maximum = maximum;
        self
    }

    /// Build a spec from one entry of a JSON Schema `properties` object.
    pub fn from_property(property: &Value, required: bool) -> Self {
        let constraints = ParameterConstraints {
            allowed_values: property
                .get("enum")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
            minimum: property.get("minimum").and_then(Value::as_f64),
            maximum: property.get("maximum").and_then(Value::as_f64),
            default: property.get("default").cloned(),
        };

        Self {
            param_type: ParameterType::from_schema(property.get("type")),
            required,
            description: property
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string),
            constraints,
        }
    }
}

/// A tool advertised by the tool server.
///
/// Immutable once fetched; the whole catalog is replaced on refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    /// Unique, stable identifier (e.g., "get_customers")
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Parameter name → specification, ordered by name
    pub parameters: BTreeMap<String, ParameterSpec>,
    /// The schema exactly as the server sent it
    #[serde(default)]
    pub input_schema: Value,
}

impl ToolDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: BTreeMap::new(),
            input_schema: Value::Null,
        }
    }

    pub fn with_parameter(mut self, name: impl Into<String>, spec: ParameterSpec) -> Self {
        self.parameters.insert(name.into(), spec);
        self
    }

    /// Build a descriptor from an MCP `inputSchema` (a JSON Schema object).
    pub fn from_input_schema(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
    ) -> Self {
        let required: Vec<&str> = input_schema
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let parameters = input_schema
            .get("properties")
            .and_then(Value::as_object)
            .into_iter()
            .flatten()
            .map(|(param, property)| {
                let is_required = required.contains(&param.as_str());
                (
                    param.clone(),
                    ParameterSpec::from_property(property, is_required),
                )
            })
            .collect();

        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            input_schema,
        }
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.get(name)
    }

    pub fn required_parameters(&self) -> impl Iterator<Item = &str> {
        self.parameters
            .iter()
            .filter(|(_, spec)| spec.required)
            .map(|(name, _)| name.as_str())
    }

    /// Whether the schema forbids parameters it does not declare
    pub fn rejects_unknown_parameters(&self) -> bool {
        self.input_schema.get("additionalProperties") == Some(&Value::Bool(false))
    }

    /// Parameter shape shown to the language model.
    ///
    /// Uses the server's own `properties` object when present so the model sees
    /// the same descriptions the server wrote.
    pub fn prompt_parameters(&self) -> Value {
        match self.input_schema.get("properties") {
            Some(properties @ Value::Object(_)) => properties.clone(),
            _ => serde_json::to_value(&self.parameters)
                .unwrap_or(Value::Object(Default::default())),
        }
    }
}
