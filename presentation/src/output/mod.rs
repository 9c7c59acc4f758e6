//! Output formatting for replies, tool listings and status

pub mod console;
pub mod formatter;
pub mod json;

use concierge_domain::OutputFormat;
pub use console::ConsoleFormatter;
pub use formatter::OutputFormatter;
pub use json::JsonFormatter;

/// Formatter for the requested output format
pub fn formatter_for(format: OutputFormat, show_details: bool) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Text => Box::new(ConsoleFormatter::new().with_details(show_details)),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}
