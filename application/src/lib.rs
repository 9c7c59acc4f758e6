//! Application layer for tool-concierge
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::BehaviorConfig;
pub use ports::{
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    llm_gateway::{GatewayError, LlmGateway},
    progress::{NoProgress, TurnProgressNotifier},
    tool_server::{ToolServerError, ToolServerSession, ToolServerTransport, TransportError},
};
pub use use_cases::compose_response::ComposeResponseUseCase;
pub use use_cases::invoke_tool::InvokeToolUseCase;
pub use use_cases::negotiate_transport::{
    ConnectError, NegotiatedSession, TransportAttempt, TransportNegotiator,
};
pub use use_cases::orchestrator::{Orchestrator, OrchestratorError, TurnOptions};
pub use use_cases::resolve_intent::ResolveIntentUseCase;
