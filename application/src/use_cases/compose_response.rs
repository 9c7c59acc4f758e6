//! Compose Response use case.
//!
//! Turns a successful tool result into a conversational reply, falling back
//! to the result's own text when the model cannot help.

use crate::ports::llm_gateway::LlmGateway;
use concierge_domain::{IntentSelection, PromptTemplate, ToolInvocationResult};
use std::sync::Arc;
use tracing::warn;

pub struct ComposeResponseUseCase {
    gateway: Arc<dyn LlmGateway>,
}

impl ComposeResponseUseCase {
    pub fn new(gateway: Arc<dyn LlmGateway>) -> Self {
        Self { gateway }
    }

    pub async fn execute(
        &self,
        user_input: &str,
        selection: &IntentSelection,
        result: &ToolInvocationResult,
    ) -> String {
        let prompt = PromptTemplate::response_composition(user_input, selection, result);

        match self.gateway.generate(&prompt).await {
            Ok(reply) if !reply.trim().is_empty() => reply,
            Ok(_) => {
                warn!("Model returned an empty reply; using tool output directly");
                result.fallback_text()
            }
            Err(e) => {
                warn!("Response formatting failed: {}; using tool output directly", e);
                result.fallback_text()
            }
        }
    }
}
