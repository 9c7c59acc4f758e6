//! Configuration file loading for tool-concierge
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `CONCIERGE_*` environment variables (`__` separates sections)
//! 2. Legacy `GEMINI_API_KEY`, `GEMINI_MODEL`, `MCP_BASE_URL` variables
//! 3. `--config <path>` specified file
//! 4. Project root: `./concierge.toml` or `./.concierge.toml`
//! 5. XDG config: `$XDG_CONFIG_HOME/tool-concierge/config.toml`
//! 6. Default values
//!
//! Command-line flags are applied on top by the binary.

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileBehaviorConfig, FileConfig, FileLoggingConfig, FileModelConfig,
    FileOutputConfig, FileReplConfig, FileServerConfig,
};
pub use loader::ConfigLoader;
