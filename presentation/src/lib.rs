//! Presentation layer for tool-concierge
//!
//! This crate contains CLI definitions, output formatters,
//! progress reporters, and the interactive chat interface.

pub mod chat;
pub mod cli;
pub mod config;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use chat::{ChatRepl, ReplCommand};
pub use cli::commands::{Cli, OutputFormat};
pub use config::{OutputConfig, ReplConfig};
pub use output::{ConsoleFormatter, JsonFormatter, OutputFormatter, formatter_for};
pub use progress::reporter::{ProgressReporter, SimpleProgress};
