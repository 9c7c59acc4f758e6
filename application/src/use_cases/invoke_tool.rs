//! Invoke Tool use case.
//!
//! Calls a tool over the active session and always returns a
//! [`ToolInvocationResult`]: request failures become failed results.

use crate::ports::tool_server::ToolServerSession;
use concierge_domain::{
    SchemaValidator, ToolArguments, ToolCatalog, ToolInvocationResult, ToolValidator,
};
use std::time::Instant;
use tracing::{debug, warn};

pub struct InvokeToolUseCase {
    /// Present only when arguments are checked locally before the call
    validator: Option<SchemaValidator>,
}

impl InvokeToolUseCase {
    pub fn new(strict_validation: bool) -> Self {
        Self {
            validator: strict_validation.then_some(SchemaValidator),
        }
    }

    pub fn is_strict(&self) -> bool {
        self.validator.is_some()
    }

    /// Invoke `tool_name` with `arguments`.
    ///
    /// Names missing from `catalog` fail without contacting the server.
    /// Schema checks run only in strict mode; otherwise the server decides.
    pub async fn execute(
        &self,
        session: &dyn ToolServerSession,
        catalog: &ToolCatalog,
        tool_name: &str,
        arguments: &ToolArguments,
    ) -> ToolInvocationResult {
        let started = Instant::now();

        let Some(descriptor) = catalog.lookup(tool_name) else {
            warn!("Model selected unknown tool '{}'", tool_name);
            return ToolInvocationResult::failure(
                tool_name,
                format!("Unknown tool '{}'", tool_name),
            )
            .with_duration_ms(elapsed_ms(started));
        };

        if let Some(validator) = &self.validator
            && let Err(e) = validator.validate(arguments, descriptor)
        {
            warn!("Rejected arguments for '{}': {}", tool_name, e);
            return ToolInvocationResult::failure(tool_name, e.to_string())
                .with_duration_ms(elapsed_ms(started));
        }

        debug!("Calling tool '{}' with {}", tool_name, arguments.to_json());
        let result = match session.call_tool(tool_name, arguments).await {
            Ok(result) => result,
            Err(e) => {
                warn!("Tool '{}' call failed: {}", tool_name, e);
                ToolInvocationResult::failure(tool_name, e.to_string())
            }
        };

        let result = result.with_duration_ms(elapsed_ms(started));
        debug!(
            "Tool '{}' finished in {}ms (succeeded: {})",
            tool_name,
            result.duration_ms().unwrap_or_default(),
            result.succeeded()
        );
        result
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::tool_server::ToolServerError;
    use async_trait::async_trait;
    use concierge_domain::{ContentItem, ToolDescriptor, TransportKind};
    use serde_json::json;
    use std::sync::Mutex;

    struct RecordingSession {
        reply: Result<ToolInvocationResult, ToolServerError>,
        calls: Mutex<Vec<String>>,
    }

    impl RecordingSession {
        fn new(reply: Result<ToolInvocationResult, ToolServerError>) -> Self {
            Self {
                reply,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ToolServerSession for RecordingSession {
        fn kind(&self) -> TransportKind {
            TransportKind::StreamableHttp
        }

        async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ToolServerError> {
            Ok(vec![])
        }

        async fn call_tool(
            &self,
            name: &str,
            _arguments: &ToolArguments,
        ) -> Result<ToolInvocationResult, ToolServerError> {
            self.calls.lock().unwrap().push(name.to_string());
            self.reply.clone()
        }

        async fn close(&self) -> Result<(), ToolServerError> {
            Ok(())
        }
    }

    fn catalog() -> ToolCatalog {
        ToolCatalog::new(vec![ToolDescriptor::from_input_schema(
            "get_products",
            "Products",
            json!({
                "type": "object",
                "properties": {"min_price": {"type": "number"}},
                "required": ["min_price"]
            }),
        )])
    }

    #[tokio::test]
    async fn test_success_records_duration() {
        let session = RecordingSession::new(Ok(ToolInvocationResult::success(
            "get_products",
            vec![ContentItem::text("2 products")],
        )));
        let invoker = InvokeToolUseCase::new(false);

        let args = ToolArguments::new().with("min_price", 10i64);
        let result = invoker.execute(&session, &catalog(), "get_products", &args).await;

        assert!(result.succeeded());
        assert_eq!(result.first_text(), Some("2 products"));
        assert!(result.duration_ms().is_some());
    }

    #[tokio::test]
    async fn test_transport_error_becomes_failed_result() {
        let session =
            RecordingSession::new(Err(ToolServerError::Transport("connection reset".into())));
        let invoker = InvokeToolUseCase::new(false);

        let result = invoker
            .execute(&session, &catalog(), "get_products", &ToolArguments::new())
            .await;

        assert!(!result.succeeded());
        assert_eq!(result.raw_error(), Some("Transport error: connection reset"));
    }

    #[tokio::test]
    async fn test_unknown_tool_fails_without_call() {
        let session = RecordingSession::new(Ok(ToolInvocationResult::success("x", vec![])));
        let invoker = InvokeToolUseCase::new(false);

        let result = invoker
            .execute(&session, &catalog(), "get_invoices", &ToolArguments::new())
            .await;

        assert!(!result.succeeded());
        assert_eq!(result.raw_error(), Some("Unknown tool 'get_invoices'"));
        assert!(session.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_relaxed_mode_lets_server_judge_arguments() {
        let session = RecordingSession::new(Ok(ToolInvocationResult::failure(
            "get_products",
            "min_price is required",
        )));
        let invoker = InvokeToolUseCase::new(false);

        let result = invoker
            .execute(&session, &catalog(), "get_products", &ToolArguments::new())
            .await;

        assert_eq!(session.calls.lock().unwrap().len(), 1);
        assert_eq!(result.raw_error(), Some("min_price is required"));
    }

    #[tokio::test]
    async fn test_strict_mode_rejects_locally() {
        let session =
            RecordingSession::new(Ok(ToolInvocationResult::success("get_products", vec![])));
        let invoker = InvokeToolUseCase::new(true);
        assert!(invoker.is_strict());

        let result = invoker
            .execute(&session, &catalog(), "get_products", &ToolArguments::new())
            .await;

        assert!(!result.succeeded());
        assert!(result.raw_error().unwrap().contains("Missing required parameter 'min_price'"));
        assert!(session.calls.lock().unwrap().is_empty());
    }
}
