//! Tool server configuration from TOML (`[server]` section)

use serde::{Deserialize, Serialize};

/// Raw tool server configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileServerConfig {
    /// MCP endpoint tried first with Streamable HTTP
    pub endpoint: String,
    /// Endpoint for the legacy SSE fallback; defaults to `endpoint`
    pub sse_endpoint: Option<String>,
    /// Upper bound for a single request to the tool server
    pub request_timeout_seconds: u64,
    /// Client name announced during the handshake
    pub client_name: String,
}

impl Default for FileServerConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:3001/mcp".to_string(),
            sse_endpoint: None,
            request_timeout_seconds: 30,
            client_name: "tool-concierge".to_string(),
        }
    }
}

impl FileServerConfig {
    pub fn sse_endpoint(&self) -> &str {
        self.sse_endpoint.as_deref().unwrap_or(&self.endpoint)
    }
}
