//! Session lifecycle entities

use serde::{Deserialize, Serialize};

/// Wire protocol used to reach the tool server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    /// Single-endpoint HTTP where each request may answer with JSON or an event stream
    StreamableHttp,
    /// Legacy long-lived event stream plus a separate POST endpoint
    Sse,
}

impl TransportKind {
    pub fn as_str(&self) -> &str {
        match self {
            TransportKind::StreamableHttp => "streamable-http",
            TransportKind::Sse => "sse",
        }
    }
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// State of the link to the tool server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Disconnected,
    Connected(TransportKind),
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected(_))
    }

    pub fn transport(&self) -> Option<TransportKind> {
        match self {
            ConnectionState::Connected(kind) => Some(*kind),
            ConnectionState::Disconnected => None,
        }
    }
}

/// Lifecycle of the orchestrator
///
/// ```text
/// Uninitialized → Connecting → Ready ⇄ Processing
///                      ↓          ↓
///                 Disconnected ←──┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrchestratorState {
    Uninitialized,
    Connecting,
    Ready,
    Processing,
    Disconnected,
}

impl OrchestratorState {
    pub fn as_str(&self) -> &str {
        match self {
            OrchestratorState::Uninitialized => "uninitialized",
            OrchestratorState::Connecting => "connecting",
            OrchestratorState::Ready => "ready",
            OrchestratorState::Processing => "processing",
            OrchestratorState::Disconnected => "disconnected",
        }
    }
}

impl std::fmt::Display for OrchestratorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Name and version the client announces during the protocol handshake
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientIdentity {
    pub name: String,
    pub version: String,
}

impl ClientIdentity {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Identity for one connection attempt, suffixed with the transport name
    pub fn for_transport(&self, kind: TransportKind) -> Self {
        Self {
            name: format!("{}-{}", self.name, kind.as_str()),
            version: self.version.clone(),
        }
    }
}

/// Snapshot of the orchestrator for status displays
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub state: OrchestratorState,
    pub transport: Option<TransportKind>,
    pub endpoint: String,
    pub tool_count: usize,
    pub model: String,
}
