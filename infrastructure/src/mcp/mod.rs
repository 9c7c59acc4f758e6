//! MCP client transports
//!
//! Two [`ToolServerTransport`](concierge_application::ToolServerTransport)
//! implementations over `reqwest`:
//!
//! - [`StreamableHttpTransport`]: the current single-endpoint transport
//! - [`SseTransport`]: the legacy event-stream transport, used as fallback

mod client;
pub mod error;
pub mod protocol;
pub mod sse;
pub mod sse_transport;
pub mod streamable_http;

#[cfg(test)]
pub(crate) mod test_server;

use concierge_application::ToolServerTransport;
use std::sync::Arc;
use std::time::Duration;

pub use error::McpError;
pub use sse_transport::{SseSession, SseTransport};
pub use streamable_http::{StreamableHttpSession, StreamableHttpTransport};

/// Transports in negotiation order: Streamable HTTP first, then SSE.
pub fn negotiation_order(
    endpoint: &str,
    sse_endpoint: &str,
    request_timeout: Duration,
) -> Vec<Arc<dyn ToolServerTransport>> {
    let client = reqwest::Client::new();
    vec![
        Arc::new(StreamableHttpTransport::with_client(
            client.clone(),
            endpoint,
            request_timeout,
        )),
        Arc::new(SseTransport::with_client(client, sse_endpoint, request_timeout)),
    ]
}
