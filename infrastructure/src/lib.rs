//! Infrastructure layer for tool-concierge
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: the MCP transports, the Gemini gateway,
//! the conversation transcript and configuration file loading.

pub mod config;
pub mod logging;
pub mod mcp;
pub mod providers;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileBehaviorConfig, FileConfig, FileLoggingConfig,
    FileModelConfig, FileOutputConfig, FileReplConfig, FileServerConfig,
};
pub use logging::JsonlConversationLogger;
pub use mcp::{McpError, SseTransport, StreamableHttpTransport, negotiation_order};
pub use providers::GeminiGateway;
