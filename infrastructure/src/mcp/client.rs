//! Transport-independent MCP operations.
//!
//! Both HTTP transports implement [`RpcChannel`]; the handshake, paging
//! through `tools/list` and `tools/call` are written once on top of it.

use super::error::{McpError, Result};
use super::protocol::{
    CallToolResult, InitializeResult, JsonRpcNotification, JsonRpcRequest, ListToolsResult,
};
use async_trait::async_trait;
use concierge_domain::{ClientIdentity, ToolArguments, ToolDescriptor, ToolInvocationResult};
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Upper bound on `tools/list` pages, in case a server keeps returning cursors
const MAX_TOOL_PAGES: usize = 64;

/// Request/response exchange over one MCP session
#[async_trait]
pub(crate) trait RpcChannel: Send + Sync {
    /// Send a request and return its `result` payload.
    async fn request(&self, request: JsonRpcRequest) -> Result<Value>;

    /// Send a notification; no response is expected.
    async fn notify(&self, notification: JsonRpcNotification) -> Result<()>;
}

/// Run the `initialize` exchange and acknowledge it.
pub(crate) async fn handshake(
    channel: &dyn RpcChannel,
    identity: &ClientIdentity,
) -> Result<InitializeResult> {
    let result = channel.request(JsonRpcRequest::initialize(identity)).await?;
    let init: InitializeResult = serde_json::from_value(result)?;

    if let Some(info) = &init.server_info {
        info!(
            "Connected to MCP server {} {} (protocol {})",
            info.name.as_deref().unwrap_or("<unnamed>"),
            info.version.as_deref().unwrap_or("<unknown>"),
            init.negotiated_version()
        );
    }

    channel.notify(JsonRpcNotification::initialized()).await?;
    Ok(init)
}

/// Collect every page of `tools/list`.
pub(crate) async fn list_all_tools(channel: &dyn RpcChannel) -> Result<Vec<ToolDescriptor>> {
    let mut tools = Vec::new();
    let mut cursor: Option<String> = None;
    let mut seen = HashSet::new();

    for _ in 0..MAX_TOOL_PAGES {
        let result = channel
            .request(JsonRpcRequest::list_tools(cursor.as_deref()))
            .await?;
        let page: ListToolsResult = serde_json::from_value(result)?;
        tools.extend(page.tools.into_iter().map(|tool| tool.into_descriptor()));

        match page.next_cursor {
            Some(next) if !next.is_empty() && seen.insert(next.clone()) => cursor = Some(next),
            _ => {
                debug!("tools/list returned {} tools", tools.len());
                return Ok(tools);
            }
        }
    }

    warn!(
        "tools/list still paging after {} pages, using the {} tools received",
        MAX_TOOL_PAGES,
        tools.len()
    );
    Ok(tools)
}

/// Call a tool and convert the outcome.
///
/// A JSON-RPC error is a failed request; a result flagged `isError` is a
/// tool that ran and failed.
pub(crate) async fn call_tool(
    channel: &dyn RpcChannel,
    name: &str,
    arguments: &ToolArguments,
) -> Result<ToolInvocationResult> {
    let result = channel
        .request(JsonRpcRequest::call_tool(name, arguments))
        .await?;
    let result: CallToolResult = serde_json::from_value(result).map_err(|e| {
        McpError::InvalidMessage(format!("tools/call result for '{}': {}", name, e))
    })?;
    Ok(result.into_invocation_result(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays scripted results and records what was sent
    struct ScriptedChannel {
        results: Mutex<VecDeque<Result<Value>>>,
        sent: Mutex<Vec<(String, Option<Value>)>>,
    }

    impl ScriptedChannel {
        fn new(results: Vec<Result<Value>>) -> Self {
            Self {
                results: Mutex::new(results.into()),
                sent: Mutex::new(Vec::new()),
            }
        }

        fn methods(&self) -> Vec<String> {
            self.sent.lock().unwrap().iter().map(|(m, _)| m.clone()).collect()
        }
    }

    #[async_trait]
    impl RpcChannel for ScriptedChannel {
        async fn request(&self, request: JsonRpcRequest) -> Result<Value> {
            self.sent
                .lock()
                .unwrap()
                .push((request.method.clone(), request.params.clone()));
            self.results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(McpError::StreamClosed))
        }

        async fn notify(&self, notification: JsonRpcNotification) -> Result<()> {
            self.sent
                .lock()
                .unwrap()
                .push((notification.method.clone(), None));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_handshake_sends_initialized() {
        let channel = ScriptedChannel::new(vec![Ok(json!({
            "protocolVersion": "2025-03-26",
            "capabilities": {"tools": {}},
            "serverInfo": {"name": "customers", "version": "1.0.0"}
        }))]);

        let identity = ClientIdentity::new("tool-concierge-streamable-http", "0.4.0");
        let init = handshake(&channel, &identity).await.unwrap();

        assert_eq!(init.negotiated_version(), "2025-03-26");
        assert_eq!(
            channel.methods(),
            vec!["initialize", "notifications/initialized"]
        );
    }

    #[tokio::test]
    async fn test_handshake_error_is_propagated() {
        let channel = ScriptedChannel::new(vec![Err(McpError::Rpc {
            code: -32600,
            message: "unsupported".into(),
        })]);
        let identity = ClientIdentity::new("tool-concierge-sse", "0.4.0");

        assert!(handshake(&channel, &identity).await.is_err());
        assert_eq!(channel.methods(), vec!["initialize"]);
    }

    #[tokio::test]
    async fn test_list_tools_follows_cursor() {
        let channel = ScriptedChannel::new(vec![
            Ok(json!({"tools": [{"name": "a"}], "nextCursor": "page-2"})),
            Ok(json!({"tools": [{"name": "b"}, {"name": "c"}]})),
        ]);

        let tools = list_all_tools(&channel).await.unwrap();
        let names: Vec<_> = tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);

        let sent = channel.sent.lock().unwrap();
        assert!(sent[0].1.is_none());
        assert_eq!(sent[1].1.as_ref().unwrap()["cursor"], "page-2");
    }

    #[tokio::test]
    async fn test_list_tools_stops_on_repeated_cursor() {
        let channel = ScriptedChannel::new(vec![
            Ok(json!({"tools": [{"name": "a"}], "nextCursor": "same"})),
            Ok(json!({"tools": [{"name": "b"}], "nextCursor": "same"})),
        ]);

        let tools = list_all_tools(&channel).await.unwrap();
        assert_eq!(tools.len(), 2);
        assert_eq!(channel.methods().len(), 2);
    }

    #[tokio::test]
    async fn test_call_tool_converts_error_result() {
        let channel = ScriptedChannel::new(vec![Ok(json!({
            "content": [{"type": "text", "text": "boom"}],
            "isError": true
        }))]);

        let result = call_tool(&channel, "explode", &ToolArguments::new())
            .await
            .unwrap();
        assert!(!result.succeeded());
        assert_eq!(result.tool_name(), "explode");
        assert_eq!(result.raw_error(), Some("boom"));
    }

    #[tokio::test]
    async fn test_call_tool_rejects_malformed_result() {
        let channel = ScriptedChannel::new(vec![Ok(json!({"content": "not a list"}))]);
        let err = call_tool(&channel, "greet", &ToolArguments::new())
            .await
            .unwrap_err();
        assert!(matches!(err, McpError::InvalidMessage(_)));
    }
}
