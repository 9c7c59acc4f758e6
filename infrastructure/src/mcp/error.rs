//! Error types for the MCP transports

use concierge_application::{ToolServerError, TransportError};
use std::time::Duration;
use thiserror::Error;

/// Result type alias for MCP operations
pub type Result<T> = std::result::Result<T, McpError>;

/// Errors that can occur when talking to an MCP server over HTTP
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Could not reach {url}: {reason}")]
    Connect { url: String, reason: String },

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid server message: {0}")]
    InvalidMessage(String),

    #[error("JSON-RPC error (code {code}): {message}")]
    Rpc { code: i64, message: String },

    #[error("Stream closed before a response arrived")]
    StreamClosed,

    #[error("Session expired or closed by the server")]
    SessionClosed,

    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

impl McpError {
    pub(crate) fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_connect() {
            McpError::Connect {
                url: url.to_string(),
                reason: err.to_string(),
            }
        } else if let Some(status) = err.status() {
            McpError::Status {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            McpError::Http(err.to_string())
        }
    }
}

impl From<McpError> for TransportError {
    fn from(err: McpError) -> Self {
        match err {
            McpError::Connect { .. } => TransportError::Unreachable(err.to_string()),
            McpError::Status { status, message } => TransportError::Rejected { status, message },
            McpError::Timeout(after) => TransportError::Timeout(after),
            McpError::Rpc { .. } | McpError::StreamClosed | McpError::SessionClosed => {
                TransportError::Handshake(err.to_string())
            }
            McpError::Http(_) => TransportError::Unreachable(err.to_string()),
            McpError::Serialization(_) | McpError::InvalidMessage(_) => {
                TransportError::Protocol(err.to_string())
            }
        }
    }
}

impl From<McpError> for ToolServerError {
    fn from(err: McpError) -> Self {
        match err {
            McpError::Rpc { code, message } => ToolServerError::Rpc { code, message },
            McpError::Timeout(after) => ToolServerError::Timeout(after),
            McpError::SessionClosed | McpError::StreamClosed => ToolServerError::Closed,
            McpError::Serialization(_) | McpError::InvalidMessage(_) => {
                ToolServerError::Protocol(err.to_string())
            }
            McpError::Connect { .. } | McpError::Status { .. } | McpError::Http(_) => {
                ToolServerError::Transport(err.to_string())
            }
        }
    }
}
