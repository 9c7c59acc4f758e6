//! Interactive chat module
//!
//! Provides a line-editor based chat interface over the orchestrator.

mod command;
mod repl;

pub use command::ReplCommand;
pub use repl::ChatRepl;
