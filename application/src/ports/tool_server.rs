//! Tool server ports
//!
//! A [`ToolServerTransport`] knows how to open one kind of connection to the
//! tool server; the [`ToolServerSession`] it returns lists and calls tools
//! until it is closed.

use async_trait::async_trait;
use concierge_domain::{
    ClientIdentity, ToolArguments, ToolDescriptor, ToolInvocationResult, TransportKind,
};
use std::time::Duration;
use thiserror::Error;

/// Failure to open a session over one transport
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("Server unreachable: {0}")]
    Unreachable(String),

    #[error("Server rejected the connection (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Handshake failed: {0}")]
    Handshake(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

/// Failure of a request over an open session
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolServerError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Server error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Session closed")]
    Closed,
}

/// One way of reaching the tool server
#[async_trait]
pub trait ToolServerTransport: Send + Sync {
    fn kind(&self) -> TransportKind;

    /// URL this transport connects to
    fn endpoint(&self) -> &str;

    /// Connect and complete the protocol handshake.
    ///
    /// On error the transport releases anything it opened.
    async fn open(
        &self,
        identity: &ClientIdentity,
    ) -> Result<Box<dyn ToolServerSession>, TransportError>;
}

/// An initialized session with the tool server
#[async_trait]
pub trait ToolServerSession: Send + Sync {
    fn kind(&self) -> TransportKind;

    /// Whether the server side has gone away (stream ended, session expired)
    fn is_closed(&self) -> bool {
        false
    }

    /// Every tool the server advertises
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ToolServerError>;

    /// Call a tool.
    ///
    /// A tool that ran and reported an error comes back as `Ok` with a
    /// failed [`ToolInvocationResult`]; `Err` means the request itself failed.
    async fn call_tool(
        &self,
        name: &str,
        arguments: &ToolArguments,
    ) -> Result<ToolInvocationResult, ToolServerError>;

    /// Release the session. Safe to call more than once.
    async fn close(&self) -> Result<(), ToolServerError>;
}
