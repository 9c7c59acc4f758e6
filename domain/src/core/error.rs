//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("Tool arguments must be a JSON object, got {0}")]
    ArgumentsNotAnObject(String),

    #[error("User input is empty")]
    EmptyInput,

    #[error("User input exceeds {limit} characters")]
    InputTooLong { limit: usize },
}

/// Failure to read a tool selection out of a model reply
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IntentParseError {
    #[error("No JSON object found in model reply")]
    NoJsonObject,

    #[error("Invalid JSON in model reply: {0}")]
    InvalidJson(String),
}
