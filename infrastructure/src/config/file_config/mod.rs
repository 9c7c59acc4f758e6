//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod behavior;
mod logging;
mod model;
mod output;
mod repl;
mod server;

pub use behavior::FileBehaviorConfig;
pub use logging::FileLoggingConfig;
pub use model::{DEFAULT_API_BASE, FileModelConfig};
pub use output::FileOutputConfig;
pub use repl::FileReplConfig;
pub use server::FileServerConfig;

use concierge_application::BehaviorConfig;
use concierge_domain::ClientIdentity;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Configuration problems that stop the program from starting
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    #[error(
        "Gemini API key is required. Set GEMINI_API_KEY, CONCIERGE_MODEL__API_KEY or [model] api_key"
    )]
    MissingApiKey,

    #[error("model name cannot be empty")]
    EmptyModelName,

    #[error("{field} is not a valid http(s) URL: {value}")]
    InvalidUrl { field: &'static str, value: String },

    #[error("{field} cannot be 0")]
    InvalidTimeout { field: &'static str },
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Tool server connection
    pub server: FileServerConfig,
    /// Language model provider
    pub model: FileModelConfig,
    /// Orchestrator behavior
    pub behavior: FileBehaviorConfig,
    /// Diagnostic and transcript logs
    pub logging: FileLoggingConfig,
    /// REPL settings
    pub repl: FileReplConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Check everything needed to construct the orchestrator.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.model.api_key().is_none() {
            return Err(ConfigValidationError::MissingApiKey);
        }
        if self.model.model.trim().is_empty() {
            return Err(ConfigValidationError::EmptyModelName);
        }

        check_url("server.endpoint", &self.server.endpoint)?;
        if let Some(sse) = &self.server.sse_endpoint {
            check_url("server.sse_endpoint", sse)?;
        }
        check_url("model.api_base", &self.model.api_base)?;

        if self.server.request_timeout_seconds == 0 {
            return Err(ConfigValidationError::InvalidTimeout {
                field: "server.request_timeout_seconds",
            });
        }
        if self.model.timeout_seconds == 0 {
            return Err(ConfigValidationError::InvalidTimeout {
                field: "model.timeout_seconds",
            });
        }
        if let Some(0) = self.behavior.turn_timeout_seconds {
            return Err(ConfigValidationError::InvalidTimeout {
                field: "behavior.turn_timeout_seconds",
            });
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_seconds)
    }

    pub fn model_timeout(&self) -> Duration {
        Duration::from_secs(self.model.timeout_seconds)
    }

    /// Orchestrator settings derived from this file
    pub fn behavior_config(&self) -> BehaviorConfig {
        BehaviorConfig::from_timeout_seconds(self.behavior.turn_timeout_seconds)
            .with_strict_validation(self.behavior.strict_validation)
            .with_client_identity(ClientIdentity::new(
                self.server.client_name.clone(),
                env!("CARGO_PKG_VERSION"),
            ))
    }
}

fn check_url(field: &'static str, value: &str) -> Result<(), ConfigValidationError> {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => Ok(()),
        _ => Err(ConfigValidationError::InvalidUrl {
            field,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> FileConfig {
        let mut config = FileConfig::default();
        config.model.api_key = Some("test-key".to_string());
        config
    }

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[server]
endpoint = "http://tools.internal:8080/mcp"
sse_endpoint = "http://tools.internal:8080/sse"
request_timeout_seconds = 10

[model]
api_key = "abc"
model = "gemini-2.0-flash"

[behavior]
turn_timeout_seconds = 45
strict_validation = true

[logging]
conversation_log = "/tmp/concierge.jsonl"

[repl]
show_progress = false
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.endpoint, "http://tools.internal:8080/mcp");
        assert_eq!(config.server.sse_endpoint(), "http://tools.internal:8080/sse");
        assert_eq!(config.server.request_timeout_seconds, 10);
        assert_eq!(config.model.api_key(), Some("abc"));
        assert_eq!(config.model.model, "gemini-2.0-flash");
        assert_eq!(config.behavior.turn_timeout_seconds, Some(45));
        assert!(config.behavior.strict_validation);
        assert_eq!(config.logging.conversation_log.as_deref(), Some("/tmp/concierge.jsonl"));
        assert!(!config.repl.show_progress);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: FileConfig = toml::from_str("[model]\nmodel = \"gemini-pro\"\n").unwrap();
        assert_eq!(config.model.model, "gemini-pro");
        // Defaults should apply
        assert_eq!(config.server.endpoint, "http://localhost:3001/mcp");
        assert_eq!(config.server.sse_endpoint(), "http://localhost:3001/mcp");
        assert!(config.repl.show_progress);
        assert!(!config.behavior.strict_validation);
    }

    #[test]
    fn test_missing_api_key_is_fatal() {
        assert_eq!(
            FileConfig::default().validate(),
            Err(ConfigValidationError::MissingApiKey)
        );
    }

    #[test]
    fn test_invalid_endpoint() {
        let mut config = valid();
        config.server.endpoint = "localhost:3001".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidUrl { field: "server.endpoint", .. })
        ));

        let mut config = valid();
        config.server.sse_endpoint = Some("ftp://example.com/sse".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timeouts_rejected() {
        let mut config = valid();
        config.behavior.turn_timeout_seconds = Some(0);
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::InvalidTimeout { field: "behavior.turn_timeout_seconds" })
        );

        let mut config = valid();
        config.server.request_timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_behavior_config() {
        let mut config = valid();
        config.behavior.strict_validation = true;
        config.behavior.turn_timeout_seconds = None;
        config.server.client_name = "shop-assistant".to_string();

        let behavior = config.behavior_config();
        assert!(behavior.strict_validation);
        assert!(behavior.turn_timeout.is_none());
        assert_eq!(behavior.client_identity.name, "shop-assistant");
    }
}
