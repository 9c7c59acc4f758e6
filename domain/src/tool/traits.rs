//! Tool domain traits
//!
//! Contains pure validation logic for tool arguments.
//! The async tool server ports are defined in the application layer.

use super::entities::{ParameterSpec, ParameterType, ToolDescriptor};
use super::value_objects::{ArgumentValue, ToolArguments};
use thiserror::Error;

/// Why a set of arguments does not fit a tool's schema
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArgumentValidationError {
    #[error("Missing required parameter '{parameter}' for tool '{tool}'")]
    MissingParameter { tool: String, parameter: String },

    #[error("Unknown parameter '{parameter}' for tool '{tool}'")]
    UnknownParameter { tool: String, parameter: String },

    #[error("Parameter '{parameter}' of tool '{tool}' expects {expected}, got {actual}")]
    TypeMismatch {
        tool: String,
        parameter: String,
        expected: ParameterType,
        actual: &'static str,
    },

    #[error("Parameter '{parameter}' of tool '{tool}' is not one of the allowed values")]
    NotAllowed { tool: String, parameter: String },

    #[error("Parameter '{parameter}' of tool '{tool}' is out of range")]
    OutOfRange { tool: String, parameter: String },
}

/// Validator for tool arguments
///
/// A pure domain trait that checks arguments against a descriptor
/// without any I/O.
pub trait ToolValidator {
    fn validate(
        &self,
        arguments: &ToolArguments,
        descriptor: &ToolDescriptor,
    ) -> Result<(), ArgumentValidationError>;
}

/// Checks required parameters, declared types, `enum` membership and
/// numeric bounds. Parameters of unknown type accept any value.
#[derive(Debug, Clone, Default)]
pub struct SchemaValidator;

impl ToolValidator for SchemaValidator {
    fn validate(
        &self,
        arguments: &ToolArguments,
        descriptor: &ToolDescriptor,
    ) -> Result<(), ArgumentValidationError> {
        for required in descriptor.required_parameters() {
            let present = arguments.get(required).is_some_and(|v| !v.is_null());
            if !present {
                return Err(ArgumentValidationError::MissingParameter {
                    tool: descriptor.name.clone(),
                    parameter: required.to_string(),
                });
            }
        }

        for (name, value) in arguments.iter() {
            match descriptor.parameter(name) {
                Some(spec) => check_value(&descriptor.name, name, value, spec)?,
                None if descriptor.rejects_unknown_parameters() => {
                    return Err(ArgumentValidationError::UnknownParameter {
                        tool: descriptor.name.clone(),
                        parameter: name.to_string(),
                    });
                }
                None => {}
            }
        }

        Ok(())
    }
}

fn check_value(
    tool: &str,
    parameter: &str,
    value: &ArgumentValue,
    spec: &ParameterSpec,
) -> Result<(), ArgumentValidationError> {
    // Explicit null on an optional parameter means "not set"
    if value.is_null() && !spec.required {
        return Ok(());
    }

    let type_ok = match spec.param_type {
        ParameterType::Unknown => true,
        ParameterType::String => matches!(value, ArgumentValue::String(_)),
        ParameterType::Number => matches!(value, ArgumentValue::Number(_)),
        ParameterType::Integer => value.is_integer(),
        ParameterType::Boolean => matches!(value, ArgumentValue::Boolean(_)),
        ParameterType::Array => matches!(value, ArgumentValue::Array(_)),
        ParameterType::Object => matches!(value, ArgumentValue::Object(_)),
    };
    if !type_ok {
        return Err(ArgumentValidationError::TypeMismatch {
            tool: tool.to_string(),
            parameter: parameter.to_string(),
            expected: spec.param_type,
            actual: value.type_name(),
        });
    }

    let constraints = &spec.constraints;
    if !constraints.allowed_values.is_empty() {
        let json = value.to_json();
        if !constraints.allowed_values.contains(&json) {
            return Err(ArgumentValidationError::NotAllowed {
                tool: tool.to_string(),
                parameter: parameter.to_string(),
            });
        }
    }

    if let Some(number) = value.as_f64() {
        let below = constraints.minimum.is_some_and(|min| number < min);
        let above = constraints.maximum.is_some_and(|max| number > max);
        if below || above {
            return Err(ArgumentValidationError::OutOfRange {
                tool: tool.to_string(),
                parameter: parameter.to_string(),
            });
        }
    }

    Ok(())
}
