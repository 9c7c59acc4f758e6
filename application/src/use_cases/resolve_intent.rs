//! Resolve Intent use case.
//!
//! Asks the language model which tool answers a user request. Never fails:
//! a provider error or an unreadable reply becomes "no tool".

use crate::ports::llm_gateway::LlmGateway;
use concierge_domain::util::preview;
use concierge_domain::{IntentSelection, PromptTemplate, ToolCatalog, parse_intent_selection};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct ResolveIntentUseCase {
    gateway: Arc<dyn LlmGateway>,
}

impl ResolveIntentUseCase {
    pub fn new(gateway: Arc<dyn LlmGateway>) -> Self {
        Self { gateway }
    }

    pub async fn execute(&self, user_input: &str, catalog: &ToolCatalog) -> IntentSelection {
        let prompt = PromptTemplate::intent_selection(catalog, user_input);

        let reply = match self.gateway.generate(&prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Tool selection request failed: {}", e);
                return IntentSelection::selection_error();
            }
        };
        debug!("Tool selection reply: {}", preview(&reply, 500));

        match parse_intent_selection(&reply) {
            Ok(selection) => {
                debug!(
                    "Selected tool: {}",
                    selection.selected_tool().unwrap_or("<none>")
                );
                selection
            }
            Err(e) => {
                warn!("Could not read tool selection: {}", e);
                IntentSelection::selection_error()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::llm_gateway::GatewayError;
    use async_trait::async_trait;
    use concierge_domain::ToolDescriptor;
    use std::sync::Mutex;

    struct FixedGateway {
        reply: Result<String, GatewayError>,
        prompts: Mutex<Vec<String>>,
    }

    impl FixedGateway {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn failing(error: GatewayError) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(error),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LlmGateway for FixedGateway {
        fn model_id(&self) -> &str {
            "test-model"
        }

        async fn generate(&self, prompt: &str) -> Result<String, GatewayError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone()
        }
    }

    fn catalog() -> ToolCatalog {
        ToolCatalog::new(vec![ToolDescriptor::new("get_customers", "All customers")])
    }

    #[tokio::test]
    async fn test_resolves_tool_from_prose_wrapped_json() {
        let gateway = FixedGateway::replying(
            "Sure:\n```json\n{\"toolName\": \"get_customers\", \"parameters\": {}, \"reasoning\": \"list\"}\n```",
        );
        let resolver = ResolveIntentUseCase::new(gateway.clone());

        let selection = resolver.execute("Retrieve all customers", &catalog()).await;
        assert_eq!(selection.selected_tool(), Some("get_customers"));

        let prompts = gateway.prompts.lock().unwrap();
        assert!(prompts[0].contains("Retrieve all customers"));
        assert!(prompts[0].contains("get_customers"));
    }

    #[tokio::test]
    async fn test_non_json_reply_means_no_tool() {
        let resolver =
            ResolveIntentUseCase::new(FixedGateway::replying("I think you want customers."));
        let selection = resolver.execute("customers", &catalog()).await;
        assert_eq!(selection, IntentSelection::selection_error());
    }

    #[tokio::test]
    async fn test_provider_failure_means_no_tool() {
        let resolver = ResolveIntentUseCase::new(FixedGateway::failing(GatewayError::Timeout));
        let selection = resolver.execute("customers", &catalog()).await;
        assert!(!selection.is_tool_selected());
        assert_eq!(selection.reasoning, "error in tool selection");
    }

    #[tokio::test]
    async fn test_missing_parameters_become_empty_mapping() {
        let resolver =
            ResolveIntentUseCase::new(FixedGateway::replying(r#"{"toolName": "get_customers"}"#));
        let selection = resolver.execute("customers", &catalog()).await;
        assert_eq!(selection.selected_tool(), Some("get_customers"));
        assert!(selection.parameters.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_tool_name_passed_through() {
        let resolver = ResolveIntentUseCase::new(FixedGateway::replying(
            r#"{"toolName": "get_invoices", "parameters": {}}"#,
        ));
        let selection = resolver.execute("invoices", &catalog()).await;
        assert_eq!(selection.selected_tool(), Some("get_invoices"));
    }
}
