//! JSON-RPC and MCP message types shared by both HTTP transports.
//!
//! # Protocol Overview
//!
//! - **Requests**: client → server (`initialize`, `tools/list`, `tools/call`)
//! - **Responses**: server → client (result or error), correlated by `id`
//! - **Notifications**: either direction, no `id` (`notifications/initialized`)

use super::error::{McpError, Result};
use concierge_domain::{
    ClientIdentity, ContentItem, ToolArguments, ToolDescriptor, ToolInvocationResult,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::atomic::{AtomicU64, Ordering};

/// Protocol revision sent in `initialize` and the `MCP-Protocol-Version` header
pub const PROTOCOL_VERSION: &str = "2025-03-26";

/// Revision assumed when a server does not report one
pub const FALLBACK_PROTOCOL_VERSION: &str = "2024-11-05";

pub const METHOD_INITIALIZE: &str = "initialize";
pub const METHOD_INITIALIZED: &str = "notifications/initialized";
pub const METHOD_LIST_TOOLS: &str = "tools/list";
pub const METHOD_CALL_TOOL: &str = "tools/call";

static REQUEST_ID: AtomicU64 = AtomicU64::new(1);

fn next_id() -> u64 {
    REQUEST_ID.fetch_add(1, Ordering::SeqCst)
}

/// JSON-RPC request
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// Creates a new request with a process-unique id.
    pub fn new(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0",
            id: next_id(),
            method: method.into(),
            params,
        }
    }

    pub fn initialize(identity: &ClientIdentity) -> Self {
        Self::new(
            METHOD_INITIALIZE,
            Some(json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {},
                "clientInfo": {
                    "name": identity.name,
                    "version": identity.version,
                },
            })),
        )
    }

    pub fn list_tools(cursor: Option<&str>) -> Self {
        Self::new(METHOD_LIST_TOOLS, cursor.map(|c| json!({ "cursor": c })))
    }

    pub fn call_tool(name: &str, arguments: &ToolArguments) -> Self {
        Self::new(
            METHOD_CALL_TOOL,
            Some(json!({ "name": name, "arguments": arguments.to_json() })),
        )
    }
}

/// JSON-RPC notification (no id, no response)
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcNotification {
    pub jsonrpc: &'static str,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcNotification {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            method: method.into(),
            params: None,
        }
    }

    pub fn initialized() -> Self {
        Self::new(METHOD_INITIALIZED)
    }
}

/// JSON-RPC response
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    pub id: Option<u64>,
    pub result: Option<Value>,
    pub error: Option<RpcError>,
}

impl JsonRpcResponse {
    /// The `result` payload, or the server's error.
    pub fn into_result(self) -> Result<Value> {
        if let Some(error) = self.error {
            return Err(McpError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        self.result
            .ok_or_else(|| McpError::InvalidMessage("response has neither result nor error".into()))
    }
}

/// JSON-RPC error object
#[derive(Debug, Clone, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

/// Classification of an incoming JSON-RPC message.
#[derive(Debug, PartialEq, Eq)]
pub enum MessageKind {
    /// A response to a request we sent (has `id`, no `method`).
    Response { id: u64 },
    /// A request from the server (has `id` + `method`), e.g. `ping`.
    IncomingRequest { id: u64 },
    /// A notification (has `method`, no `id`), e.g. progress or log messages.
    Notification,
}

/// Classify a JSON-RPC message by inspecting `id` and `method` fields.
pub fn classify_message(json: &Value) -> MessageKind {
    let id = json.get("id").and_then(Value::as_u64);
    let method = json.get("method").and_then(Value::as_str);

    match (id, method) {
        (Some(id), Some(_)) => MessageKind::IncomingRequest { id },
        (Some(id), None) => MessageKind::Response { id },
        _ => MessageKind::Notification,
    }
}

/// Find the response to request `id` in one server payload.
///
/// A payload may be a single message or a JSON-RPC batch.
pub fn extract_response(payload: Value, id: u64) -> Result<Option<JsonRpcResponse>> {
    let messages = match payload {
        Value::Array(batch) => batch,
        single => vec![single],
    };

    for message in messages {
        if classify_message(&message) == (MessageKind::Response { id }) {
            return Ok(Some(serde_json::from_value(message)?));
        }
    }
    Ok(None)
}

/// `initialize` result
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    #[serde(default)]
    pub protocol_version: Option<String>,
    #[serde(default)]
    pub server_info: Option<ServerInfo>,
}

impl InitializeResult {
    pub fn negotiated_version(&self) -> &str {
        self.protocol_version
            .as_deref()
            .unwrap_or(FALLBACK_PROTOCOL_VERSION)
    }
}

/// Server info returned in the initialize response
#[derive(Debug, Clone, Deserialize)]
pub struct ServerInfo {
    pub name: Option<String>,
    pub version: Option<String>,
}

/// One tool as advertised by `tools/list`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpTool {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub input_schema: Value,
}

impl McpTool {
    pub fn into_descriptor(self) -> ToolDescriptor {
        let schema = if self.input_schema.is_object() {
            self.input_schema
        } else {
            json!({ "type": "object", "properties": {} })
        };
        ToolDescriptor::from_input_schema(self.name, self.description.unwrap_or_default(), schema)
    }
}

/// One page of `tools/list`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListToolsResult {
    #[serde(default)]
    pub tools: Vec<McpTool>,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// One content block of a `tools/call` result
#[derive(Debug, Clone, Deserialize)]
pub struct McpContent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: Option<String>,
}

/// `tools/call` result
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToolResult {
    #[serde(default)]
    pub content: Vec<McpContent>,
    #[serde(default)]
    pub is_error: bool,
    #[serde(default)]
    pub structured_content: Option<Value>,
}

impl CallToolResult {
    /// Convert into the domain result.
    ///
    /// A result flagged `isError` becomes a failure whose message is the
    /// text the tool produced.
    pub fn into_invocation_result(self, tool_name: &str) -> ToolInvocationResult {
        let content: Vec<ContentItem> = self
            .content
            .into_iter()
            .map(|block| match block.text {
                Some(text) if block.kind == "text" => ContentItem::text(text),
                _ => ContentItem::other(block.kind),
            })
            .collect();

        if self.is_error {
            let message = content
                .iter()
                .filter_map(|item| item.text.as_deref())
                .collect::<Vec<_>>()
                .join("\n");
            return ToolInvocationResult::failure(tool_name, message);
        }

        let result = ToolInvocationResult::success(tool_name, content);
        match self.structured_content {
            Some(structured) => result.with_structured_content(structured),
            None => result,
        }
    }
}
