//! Application-level configuration.
//!
//! Settings that control how the orchestrator behaves at runtime, as opposed
//! to where it connects (infrastructure) or how it looks (presentation).

use concierge_domain::ClientIdentity;
use std::time::Duration;

/// Orchestrator behavior configuration.
#[derive(Debug, Clone)]
pub struct BehaviorConfig {
    /// Upper bound for one whole turn; `None` waits indefinitely.
    pub turn_timeout: Option<Duration>,
    /// Check arguments against the tool's schema before calling it.
    pub strict_validation: bool,
    /// Identity announced to the tool server; suffixed per transport.
    pub client_identity: ClientIdentity,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            turn_timeout: Some(Duration::from_secs(120)),
            strict_validation: false,
            client_identity: ClientIdentity::new("tool-concierge", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl BehaviorConfig {
    /// Creates a BehaviorConfig from an optional timeout in seconds.
    ///
    /// If `seconds` is `None` or zero, no timeout is applied.
    pub fn from_timeout_seconds(seconds: Option<u64>) -> Self {
        Self {
            turn_timeout: seconds.filter(|s| *s > 0).map(Duration::from_secs),
            ..Self::default()
        }
    }

    pub fn with_strict_validation(mut self, strict: bool) -> Self {
        self.strict_validation = strict;
        self
    }

    pub fn with_client_identity(mut self, identity: ClientIdentity) -> Self {
        self.client_identity = identity;
        self
    }
}
