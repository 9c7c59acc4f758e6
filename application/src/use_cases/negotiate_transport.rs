//! Transport negotiation use case.
//!
//! Tries each configured transport in order (Streamable HTTP first, legacy
//! SSE second) and keeps the first session that completes its handshake.

use crate::ports::tool_server::{ToolServerSession, ToolServerTransport};
use concierge_domain::{ClientIdentity, TransportKind};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// One failed connection attempt
#[derive(Debug, Clone, PartialEq)]
pub struct TransportAttempt {
    pub kind: TransportKind,
    pub endpoint: String,
    pub error: String,
}

impl fmt::Display for TransportAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.kind, self.endpoint, self.error)
    }
}

/// Every transport failed; the caller may retry
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConnectError {
    #[error("No transports configured")]
    NoTransports,

    #[error("Could not connect to the tool server: {}", format_attempts(.attempts))]
    AllTransportsFailed { attempts: Vec<TransportAttempt> },
}

fn format_attempts(attempts: &[TransportAttempt]) -> String {
    attempts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A session opened by the negotiator
pub struct NegotiatedSession {
    pub session: Box<dyn ToolServerSession>,
    pub kind: TransportKind,
    pub endpoint: String,
}

impl fmt::Debug for NegotiatedSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NegotiatedSession")
            .field("kind", &self.kind)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Opens a tool server session over the first transport that works.
pub struct TransportNegotiator {
    transports: Vec<Arc<dyn ToolServerTransport>>,
    identity: ClientIdentity,
}

impl TransportNegotiator {
    /// `transports` are tried in the given order.
    pub fn new(transports: Vec<Arc<dyn ToolServerTransport>>, identity: ClientIdentity) -> Self {
        Self {
            transports,
            identity,
        }
    }

    /// Endpoint of the preferred transport, for status displays
    pub fn primary_endpoint(&self) -> &str {
        self.transports
            .first()
            .map(|t| t.endpoint())
            .unwrap_or_default()
    }

    pub async fn negotiate(&self) -> Result<NegotiatedSession, ConnectError> {
        if self.transports.is_empty() {
            return Err(ConnectError::NoTransports);
        }

        let mut attempts = Vec::with_capacity(self.transports.len());

        for transport in &self.transports {
            let kind = transport.kind();
            // Transports do not share session state, so each gets its own identity
            let identity = self.identity.for_transport(kind);

            match transport.open(&identity).await {
                Ok(session) => {
                    info!("Connected to {} using {}", transport.endpoint(), kind);
                    return Ok(NegotiatedSession {
                        session,
                        kind,
                        endpoint: transport.endpoint().to_string(),
                    });
                }
                Err(e) => {
                    warn!("{} connection to {} failed: {}", kind, transport.endpoint(), e);
                    attempts.push(TransportAttempt {
                        kind,
                        endpoint: transport.endpoint().to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }

        Err(ConnectError::AllTransportsFailed { attempts })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::tool_server::{ToolServerError, TransportError};
    use async_trait::async_trait;
    use concierge_domain::{ToolArguments, ToolDescriptor, ToolInvocationResult};
    use std::sync::Mutex;

    struct NullSession(TransportKind);

    #[async_trait]
    impl ToolServerSession for NullSession {
        fn kind(&self) -> TransportKind {
            self.0
        }

        async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ToolServerError> {
            Ok(vec![])
        }

        async fn call_tool(
            &self,
            name: &str,
            _arguments: &ToolArguments,
        ) -> Result<ToolInvocationResult, ToolServerError> {
            Ok(ToolInvocationResult::success(name, vec![]))
        }

        async fn close(&self) -> Result<(), ToolServerError> {
            Ok(())
        }
    }

    struct ScriptedTransport {
        kind: TransportKind,
        fail_with: Option<TransportError>,
        seen_identities: Mutex<Vec<String>>,
    }

    impl ScriptedTransport {
        fn new(kind: TransportKind, fail_with: Option<TransportError>) -> Arc<Self> {
            Arc::new(Self {
                kind,
                fail_with,
                seen_identities: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ToolServerTransport for ScriptedTransport {
        fn kind(&self) -> TransportKind {
            self.kind
        }

        fn endpoint(&self) -> &str {
            "http://localhost:3001/mcp"
        }

        async fn open(
            &self,
            identity: &ClientIdentity,
        ) -> Result<Box<dyn ToolServerSession>, TransportError> {
            self.seen_identities.lock().unwrap().push(identity.name.clone());
            match &self.fail_with {
                Some(e) => Err(e.clone()),
                None => Ok(Box::new(NullSession(self.kind))),
            }
        }
    }

    fn identity() -> ClientIdentity {
        ClientIdentity::new("concierge", "1.0.0")
    }

    #[tokio::test]
    async fn test_primary_success_skips_fallback() {
        let primary = ScriptedTransport::new(TransportKind::StreamableHttp, None);
        let fallback = ScriptedTransport::new(TransportKind::Sse, None);
        let negotiator =
            TransportNegotiator::new(vec![primary.clone(), fallback.clone()], identity());

        let negotiated = negotiator.negotiate().await.unwrap();
        assert_eq!(negotiated.kind, TransportKind::StreamableHttp);
        assert!(fallback.seen_identities.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_falls_back_with_fresh_identity() {
        let primary = ScriptedTransport::new(
            TransportKind::StreamableHttp,
            Some(TransportError::Rejected { status: 405, message: "Method Not Allowed".into() }),
        );
        let fallback = ScriptedTransport::new(TransportKind::Sse, None);
        let negotiator =
            TransportNegotiator::new(vec![primary.clone(), fallback.clone()], identity());

        let negotiated = negotiator.negotiate().await.unwrap();
        assert_eq!(negotiated.kind, TransportKind::Sse);
        assert_eq!(negotiated.session.kind(), TransportKind::Sse);
        assert_eq!(
            primary.seen_identities.lock().unwrap().as_slice(),
            ["concierge-streamable-http"]
        );
        assert_eq!(fallback.seen_identities.lock().unwrap().as_slice(), ["concierge-sse"]);
    }

    #[tokio::test]
    async fn test_all_failed_lists_attempts() {
        let primary = ScriptedTransport::new(
            TransportKind::StreamableHttp,
            Some(TransportError::Unreachable("connection refused".into())),
        );
        let fallback = ScriptedTransport::new(
            TransportKind::Sse,
            Some(TransportError::Handshake("no endpoint event".into())),
        );
        let negotiator = TransportNegotiator::new(vec![primary, fallback], identity());

        let err = negotiator.negotiate().await.unwrap_err();
        let ConnectError::AllTransportsFailed { attempts } = &err else {
            panic!("expected AllTransportsFailed, got {err:?}");
        };
        assert_eq!(attempts.len(), 2);
        let message = err.to_string();
        assert!(message.contains("streamable-http"));
        assert!(message.contains("connection refused"));
        assert!(message.contains("sse"));
        assert!(message.contains("no endpoint event"));
    }

    #[tokio::test]
    async fn test_no_transports() {
        let negotiator = TransportNegotiator::new(vec![], identity());
        assert_eq!(negotiator.negotiate().await.unwrap_err(), ConnectError::NoTransports);
        assert_eq!(negotiator.primary_endpoint(), "");
    }
}
