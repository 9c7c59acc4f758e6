//! Domain layer for tool-concierge
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! - **Tool catalog**: the tools a connected MCP server advertises
//! - **Intent selection**: the language model's pick of a tool (or none) for a request
//! - **Conversation turn**: the record of handling one user input

pub mod config;
pub mod conversation;
pub mod core;
pub mod intent;
pub mod prompt;
pub mod session;
pub mod tool;
pub mod util;

// Re-export commonly used types
pub use config::OutputFormat;
pub use conversation::{
    entities::ConversationTurn,
    history::{ConversationHistory, DEFAULT_HISTORY_CAPACITY},
};
pub use core::{
    error::{DomainError, IntentParseError},
    input::{MAX_INPUT_CHARS, UserInput},
};
pub use intent::{
    entities::{IntentSelection, SELECTION_ERROR_REASONING},
    parsing::{find_first_json_object, parse_intent_selection},
};
pub use prompt::PromptTemplate;
pub use session::entities::{
    ClientIdentity, ConnectionState, OrchestratorState, SessionStatus, TransportKind,
};
pub use tool::{
    catalog::ToolCatalog,
    entities::{ParameterConstraints, ParameterSpec, ParameterType, ToolDescriptor},
    traits::{ArgumentValidationError, SchemaValidator, ToolValidator},
    value_objects::{ArgumentValue, ContentItem, ToolArguments, ToolInvocationResult},
};
