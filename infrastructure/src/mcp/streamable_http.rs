//! Streamable HTTP transport.
//!
//! Every message is a POST to one endpoint. The server answers a request
//! either with a JSON body or with an event stream that eventually carries
//! the response. The session id handed out at `initialize` is echoed on
//! every later request and the session is ended with a DELETE.

use super::client::{self, RpcChannel};
use super::error::{McpError, Result};
use super::protocol::{JsonRpcNotification, JsonRpcRequest, PROTOCOL_VERSION, extract_response};
use super::sse::event_stream;
use async_trait::async_trait;
use concierge_application::{
    ToolServerError, ToolServerSession, ToolServerTransport, TransportError,
};
use concierge_domain::{
    ClientIdentity, ToolArguments, ToolDescriptor, ToolInvocationResult, TransportKind,
};
use futures::StreamExt;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;
use tracing::{debug, trace};

pub const SESSION_ID_HEADER: &str = "Mcp-Session-Id";
pub const PROTOCOL_VERSION_HEADER: &str = "MCP-Protocol-Version";

const ACCEPT_BOTH: &str = "application/json, text/event-stream";

/// Opens sessions against a Streamable HTTP endpoint
pub struct StreamableHttpTransport {
    client: reqwest::Client,
    endpoint: String,
    request_timeout: Duration,
}

impl StreamableHttpTransport {
    pub fn new(endpoint: impl Into<String>, request_timeout: Duration) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint, request_timeout)
    }

    pub fn with_client(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            request_timeout,
        }
    }
}

#[async_trait]
impl ToolServerTransport for StreamableHttpTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::StreamableHttp
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn open(
        &self,
        identity: &ClientIdentity,
    ) -> std::result::Result<Box<dyn ToolServerSession>, TransportError> {
        let session = StreamableHttpSession {
            client: self.client.clone(),
            endpoint: self.endpoint.clone(),
            request_timeout: self.request_timeout,
            session_id: RwLock::new(None),
            protocol_version: RwLock::new(None),
            closed: AtomicBool::new(false),
        };

        match client::handshake(&session, identity).await {
            Ok(init) => {
                *session
                    .protocol_version
                    .write()
                    .unwrap_or_else(PoisonError::into_inner) =
                    Some(init.negotiated_version().to_string());
                debug!(
                    "Streamable HTTP session open at {} (session id: {})",
                    self.endpoint,
                    session.session_id().as_deref().unwrap_or("none")
                );
                Ok(Box::new(session))
            }
            Err(e) => {
                // The server may already have allocated a session
                let _ = session.terminate().await;
                Err(e.into())
            }
        }
    }
}

/// An initialized Streamable HTTP session
pub struct StreamableHttpSession {
    client: reqwest::Client,
    endpoint: String,
    request_timeout: Duration,
    session_id: RwLock<Option<String>>,
    protocol_version: RwLock<Option<String>>,
    closed: AtomicBool,
}

impl StreamableHttpSession {
    pub fn session_id(&self) -> Option<String> {
        self.session_id
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn protocol_version(&self) -> String {
        self.protocol_version
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .unwrap_or_else(|| PROTOCOL_VERSION.to_string())
    }

    /// POST one message with the session headers attached.
    async fn post<T: Serialize + ?Sized>(&self, message: &T) -> Result<reqwest::Response> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(McpError::SessionClosed);
        }

        let mut builder = self
            .client
            .post(&self.endpoint)
            .header(ACCEPT, ACCEPT_BOTH)
            .header(PROTOCOL_VERSION_HEADER, self.protocol_version())
            .json(message);
        if let Some(id) = self.session_id() {
            builder = builder.header(SESSION_ID_HEADER, id);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| McpError::from_reqwest(&self.endpoint, e))?;

        if let Some(id) = response
            .headers()
            .get(SESSION_ID_HEADER)
            .and_then(|v| v.to_str().ok())
        {
            let mut current = self
                .session_id
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            if current.as_deref() != Some(id) {
                *current = Some(id.to_string());
            }
        }

        let status = response.status();
        if status == StatusCode::NOT_FOUND && self.session_id().is_some() {
            self.closed.store(true, Ordering::SeqCst);
            return Err(McpError::SessionClosed);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(McpError::Status {
                status: status.as_u16(),
                message: status_message(status, &body),
            });
        }

        Ok(response)
    }

    async fn exchange(&self, request: JsonRpcRequest) -> Result<Value> {
        let id = request.id;
        trace!("POST {} {} (id={})", self.endpoint, request.method, id);
        let response = self.post(&request).await?;

        let is_stream = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("text/event-stream"));

        if is_stream {
            let mut events = Box::pin(event_stream(response));
            while let Some(event) = events.next().await {
                let event = event?;
                if event.event != "message" || event.data.trim().is_empty() {
                    continue;
                }
                let payload: Value = serde_json::from_str(&event.data)?;
                if let Some(found) = extract_response(payload, id)? {
                    return found.into_result();
                }
            }
            return Err(McpError::StreamClosed);
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| McpError::InvalidMessage(format!("response body: {e}")))?;
        extract_response(payload, id)?
            .ok_or_else(|| McpError::InvalidMessage(format!("no response with id {id}")))?
            .into_result()
    }

    /// End the session on the server. A server that does not support
    /// explicit termination answers 405, which is fine.
    async fn terminate(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        let Some(id) = self.session_id() else {
            return Ok(());
        };

        let response = self
            .client
            .delete(&self.endpoint)
            .header(SESSION_ID_HEADER, id)
            .header(PROTOCOL_VERSION_HEADER, self.protocol_version())
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| McpError::from_reqwest(&self.endpoint, e))?;

        debug!("Session DELETE answered {}", response.status());
        Ok(())
    }
}

fn status_message(status: StatusCode, body: &str) -> String {
    let reason = status.canonical_reason().unwrap_or("error").to_string();
    let body = body.trim();
    if body.is_empty() {
        reason
    } else {
        format!("{}: {}", reason, concierge_domain::util::preview(body, 200))
    }
}

#[async_trait]
impl RpcChannel for StreamableHttpSession {
    async fn request(&self, request: JsonRpcRequest) -> Result<Value> {
        tokio::time::timeout(self.request_timeout, self.exchange(request))
            .await
            .map_err(|_| McpError::Timeout(self.request_timeout))?
    }

    async fn notify(&self, notification: JsonRpcNotification) -> Result<()> {
        tokio::time::timeout(self.request_timeout, self.post(&notification))
            .await
            .map_err(|_| McpError::Timeout(self.request_timeout))??;
        Ok(())
    }
}

#[async_trait]
impl ToolServerSession for StreamableHttpSession {
    fn kind(&self) -> TransportKind {
        TransportKind::StreamableHttp
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    async fn list_tools(&self) -> std::result::Result<Vec<ToolDescriptor>, ToolServerError> {
        Ok(client::list_all_tools(self).await?)
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: &ToolArguments,
    ) -> std::result::Result<ToolInvocationResult, ToolServerError> {
        Ok(client::call_tool(self, name, arguments).await?)
    }

    async fn close(&self) -> std::result::Result<(), ToolServerError> {
        if self.closed.load(Ordering::SeqCst) {
            return Ok(());
        }
        Ok(self.terminate().await?)
    }
}
