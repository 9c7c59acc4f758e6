//! LLM Gateway port
//!
//! Defines the interface for communicating with the language-model provider.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during LLM gateway operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Model returned no text")]
    EmptyResponse,

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

/// Gateway for LLM communication
///
/// Stateless: one call per prompt, no conversation memory is kept by the
/// provider between calls. Implementations (adapters) live in the
/// infrastructure layer.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Identifier of the model answering prompts (e.g., "gemini-2.5-flash")
    fn model_id(&self) -> &str;

    /// Send a prompt and return the model's text reply
    async fn generate(&self, prompt: &str) -> Result<String, GatewayError>;
}
