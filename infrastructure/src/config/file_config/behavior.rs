//! Behavior configuration from TOML (`[behavior]` section)

use serde::{Deserialize, Serialize};

/// Raw behavior configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBehaviorConfig {
    /// Upper bound for one whole turn; unset waits indefinitely
    pub turn_timeout_seconds: Option<u64>,
    /// Validate tool arguments against the tool's schema before calling it
    pub strict_validation: bool,
    /// Verbose diagnostic logging
    pub debug: bool,
}

impl Default for FileBehaviorConfig {
    fn default() -> Self {
        Self {
            turn_timeout_seconds: Some(120),
            strict_validation: false,
            debug: false,
        }
    }
}
