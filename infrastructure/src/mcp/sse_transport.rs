//! Legacy HTTP+SSE transport.
//!
//! The client holds a GET event stream open. The server's first event,
//! `endpoint`, names the URL that requests are POSTed to; responses come
//! back as `message` events on the stream. A background reader task owns
//! the stream and hands each response to the request waiting for its id.

use super::client::{self, RpcChannel};
use super::error::{McpError, Result};
use super::protocol::{
    JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, MessageKind, classify_message,
};
use super::sse::{SseEvent, event_stream};
use async_trait::async_trait;
use concierge_application::{
    ToolServerError, ToolServerSession, ToolServerTransport, TransportError,
};
use concierge_domain::{
    ClientIdentity, ToolArguments, ToolDescriptor, ToolInvocationResult, TransportKind,
};
use futures::{Stream, StreamExt};
use reqwest::Url;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

type PendingResponses = Arc<Mutex<HashMap<u64, oneshot::Sender<JsonRpcResponse>>>>;
type EventStream = Pin<Box<dyn Stream<Item = Result<SseEvent>> + Send>>;

/// Opens sessions against a legacy SSE endpoint
pub struct SseTransport {
    client: reqwest::Client,
    url: String,
    request_timeout: Duration,
}

impl SseTransport {
    pub fn new(url: impl Into<String>, request_timeout: Duration) -> Self {
        Self::with_client(reqwest::Client::new(), url, request_timeout)
    }

    pub fn with_client(
        client: reqwest::Client,
        url: impl Into<String>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            client,
            url: url.into(),
            request_timeout,
        }
    }

    /// Open the event stream and wait for the `endpoint` event.
    async fn connect_stream(&self) -> Result<(Url, EventStream)> {
        let response = self
            .client
            .get(&self.url)
            .header(ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(|e| McpError::from_reqwest(&self.url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(McpError::Status {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("error").to_string(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !content_type.starts_with("text/event-stream") {
            return Err(McpError::InvalidMessage(format!(
                "expected an event stream, got '{}'",
                content_type
            )));
        }

        let mut events: EventStream = Box::pin(event_stream(response));
        while let Some(event) = events.next().await {
            let event = event?;
            if event.event == "endpoint" {
                let post_url = resolve_endpoint(&self.url, &event.data)?;
                return Ok((post_url, events));
            }
            debug!("Ignoring '{}' event before endpoint", event.event);
        }

        Err(McpError::StreamClosed)
    }
}

/// Resolve the `endpoint` event data against the stream URL.
fn resolve_endpoint(stream_url: &str, data: &str) -> Result<Url> {
    let base = Url::parse(stream_url)
        .map_err(|e| McpError::InvalidMessage(format!("stream URL '{}': {}", stream_url, e)))?;
    base.join(data.trim())
        .map_err(|e| McpError::InvalidMessage(format!("endpoint '{}': {}", data.trim(), e)))
}

#[async_trait]
impl ToolServerTransport for SseTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Sse
    }

    fn endpoint(&self) -> &str {
        &self.url
    }

    async fn open(
        &self,
        identity: &ClientIdentity,
    ) -> std::result::Result<Box<dyn ToolServerSession>, TransportError> {
        let (post_url, events) = tokio::time::timeout(self.request_timeout, self.connect_stream())
            .await
            .map_err(|_| McpError::Timeout(self.request_timeout))??;
        debug!("SSE stream open, posting to {}", post_url);

        let session =
            SseSession::start(self.client.clone(), post_url, self.request_timeout, events);

        if let Err(e) = client::handshake(&session, identity).await {
            session.shutdown().await;
            return Err(e.into());
        }
        Ok(Box::new(session))
    }
}

/// An initialized SSE session
pub struct SseSession {
    client: reqwest::Client,
    post_url: Url,
    request_timeout: Duration,
    pending: PendingResponses,
    closed: Arc<AtomicBool>,
    cancellation: CancellationToken,
}

impl SseSession {
    fn start(
        client: reqwest::Client,
        post_url: Url,
        request_timeout: Duration,
        events: EventStream,
    ) -> Self {
        let pending: PendingResponses = Arc::new(Mutex::new(HashMap::new()));
        let closed = Arc::new(AtomicBool::new(false));
        let cancellation = CancellationToken::new();

        let reader = ReaderContext {
            client: client.clone(),
            post_url: post_url.clone(),
            pending: Arc::clone(&pending),
            closed: Arc::clone(&closed),
        };
        let token = cancellation.clone();
        tokio::spawn(async move {
            reader.run(events, token).await;
        });

        Self {
            client,
            post_url,
            request_timeout,
            pending,
            closed,
            cancellation,
        }
    }

    pub fn post_url(&self) -> &Url {
        &self.post_url
    }

    async fn post<T: Serialize + ?Sized>(&self, message: &T) -> Result<()> {
        post_message(&self.client, &self.post_url, message).await
    }

    async fn exchange(&self, request: JsonRpcRequest) -> Result<Value> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(McpError::SessionClosed);
        }

        let id = request.id;
        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(id, tx);

        trace!("POST {} {} (id={})", self.post_url, request.method, id);
        if let Err(e) = self.post(&request).await {
            self.pending.lock().await.remove(&id);
            return Err(e);
        }

        let response = rx.await.map_err(|_| McpError::StreamClosed)?;
        response.into_result()
    }

    async fn shutdown(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.cancellation.cancel();
        self.pending.lock().await.clear();
    }
}

#[async_trait]
impl RpcChannel for SseSession {
    async fn request(&self, request: JsonRpcRequest) -> Result<Value> {
        let id = request.id;
        match tokio::time::timeout(self.request_timeout, self.exchange(request)).await {
            Ok(result) => result,
            Err(_) => {
                self.pending.lock().await.remove(&id);
                Err(McpError::Timeout(self.request_timeout))
            }
        }
    }

    async fn notify(&self, notification: JsonRpcNotification) -> Result<()> {
        tokio::time::timeout(self.request_timeout, self.post(&notification))
            .await
            .map_err(|_| McpError::Timeout(self.request_timeout))?
    }
}

#[async_trait]
impl ToolServerSession for SseSession {
    fn kind(&self) -> TransportKind {
        TransportKind::Sse
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
        self.shutdown().await;
        Ok(())
    }
}

impl Drop for SseSession {
    fn drop(&mut self) {
        self.cancellation.cancel();
    }
}

async fn post_message<T: Serialize + ?Sized>(
    client: &reqwest::Client,
    url: &Url,
    message: &T,
) -> Result<()> {
    let response = client
        .post(url.clone())
        .json(message)
        .send()
        .await
        .map_err(|e| McpError::from_reqwest(url.as_str(), e))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(McpError::Status {
            status: status.as_u16(),
            message: if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("error").to_string()
            } else {
                body.trim().to_string()
            },
        });
    }
    Ok(())
}

/// State owned by the background reader task
struct ReaderContext {
    client: reqwest::Client,
    post_url: Url,
    pending: PendingResponses,
    closed: Arc<AtomicBool>,
}

impl ReaderContext {
    /// Route events until the stream ends or the session is cancelled.
    ///
    /// On exit every pending sender is dropped, so waiting requests observe
    /// a closed channel.
    async fn run(self, mut events: EventStream, cancellation: CancellationToken) {
        loop {
            let next = tokio::select! {
                _ = cancellation.cancelled() => break,
                next = events.next() => next,
            };

            match next {
                Some(Ok(event)) => self.dispatch(event).await,
                Some(Err(e)) => {
                    warn!("SSE stream error: {}", e);
                    break;
                }
                None => {
                    info!("SSE stream closed by the server");
                    break;
                }
            }
        }

        self.closed.store(true, Ordering::SeqCst);
        self.pending.lock().await.clear();
    }

    async fn dispatch(&self, event: SseEvent) {
        if event.event != "message" {
            debug!("Ignoring SSE '{}' event", event.event);
            return;
        }

        let message: Value = match serde_json::from_str(&event.data) {
            Ok(v) => v,
            Err(e) => {
                warn!("SSE message is not JSON: {} ({})", e, event.data);
                return;
            }
        };

        match classify_message(&message) {
            MessageKind::Response { id } => {
                let response: JsonRpcResponse = match serde_json::from_value(message) {
                    Ok(r) => r,
                    Err(e) => {
                        warn!("Failed to parse response id={}: {}", id, e);
                        return;
                    }
                };
                let sender = self.pending.lock().await.remove(&id);
                match sender {
                    Some(tx) => {
                        let _ = tx.send(response);
                    }
                    None => debug!("No pending request for response id={}", id),
                }
            }
            MessageKind::IncomingRequest { id } => {
                let method = message
                    .get("method")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                let reply = server_request_reply(id, method);
                if let Err(e) = post_message(&self.client, &self.post_url, &reply).await {
                    warn!("Failed to answer server request '{}': {}", method, e);
                }
            }
            MessageKind::Notification => {
                trace!("SSE notification: {}", message);
            }
        }
    }
}

/// Reply to a request the server sent us. Only `ping` is supported.
fn server_request_reply(id: u64, method: &str) -> Value {
    if method == "ping" {
        json!({ "jsonrpc": "2.0", "id": id, "result": {} })
    } else {
        json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": { "code": -32601, "message": format!("Method not found: {}", method) }
        })
    }
}
