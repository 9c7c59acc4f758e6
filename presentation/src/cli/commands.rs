//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for replies and listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Readable text
    Text,
    /// JSON documents
    Json,
}

impl From<OutputFormat> for concierge_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => concierge_domain::OutputFormat::Text,
            OutputFormat::Json => concierge_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for tool-concierge
#[derive(Parser, Debug)]
#[command(name = "concierge")]
#[command(
    author,
    version,
    about = "Ask for things in plain language; an LLM picks and runs the right MCP tool"
)]
#[command(long_about = r#"
tool-concierge connects to an MCP tool server and answers requests in plain
language. For each message the language model decides whether one of the
server's tools is needed, the tool is called, and the model turns the result
into a reply.

The client tries Streamable HTTP first and falls back to the legacy SSE
transport if the server does not support it.

Configuration files are loaded from (in priority order):
1. --config <path>       Explicit config file
2. ./concierge.toml      Project-level config
3. ~/.config/tool-concierge/config.toml   Global config

Environment: GEMINI_API_KEY, GEMINI_MODEL, MCP_BASE_URL, and CONCIERGE_*
(e.g. CONCIERGE_MODEL__API_KEY) override the files.

Example:
  concierge "Retrieve all customers"
  concierge --list-tools
  concierge --tool get_products --args '{"minPrice": 10, "maxPrice": 50}'
  concierge --chat --endpoint http://localhost:3001/mcp
"#)]
pub struct Cli {
    /// Message to handle (not required in chat mode)
    pub message: Option<String>,

    /// Start interactive chat mode
    #[arg(short, long)]
    pub chat: bool,

    /// List the tools the server offers and exit
    #[arg(long, conflicts_with_all = ["chat", "tool"])]
    pub list_tools: bool,

    /// Call a tool directly, bypassing the language model
    #[arg(long, value_name = "NAME", conflicts_with = "chat")]
    pub tool: Option<String>,

    /// JSON object of arguments for --tool
    #[arg(long, value_name = "JSON", requires = "tool")]
    pub args: Option<String>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// MCP server endpoint
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Language model to use
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Turn timeout in seconds (0 disables it)
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Check tool arguments against the tool's schema before calling it
    #[arg(long)]
    pub strict: bool,

    /// Debug logging and tool details in replies
    #[arg(long)]
    pub debug: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}
