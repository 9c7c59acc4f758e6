//! Console output formatter

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use concierge_domain::util::preview;
use concierge_domain::{
    ConversationTurn, SessionStatus, ToolDescriptor, ToolInvocationResult,
};

/// Formats results for console display
#[derive(Debug, Clone, Default)]
pub struct ConsoleFormatter {
    show_details: bool,
}

impl ConsoleFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also show the tool used, its arguments, the model's reasoning and timing
    pub fn with_details(mut self, show: bool) -> Self {
        self.show_details = show;
        self
    }

    fn turn_details(turn: &ConversationTurn) -> String {
        let mut details = Vec::new();
        match &turn.tool_used {
            Some(tool) => {
                let args = turn
                    .tool_parameters
                    .as_ref()
                    .map(|p| p.to_json().to_string())
                    .unwrap_or_else(|| "{}".to_string());
                details.push(format!("tool: {} {}", tool, args));
            }
            None => details.push("tool: none".to_string()),
        }
        if !turn.reasoning.is_empty() {
            details.push(format!("reasoning: {}", turn.reasoning));
        }
        details.push(format!("{} ms", turn.duration_ms));

        format!("{}", format!("[{}]", details.join(" | ")).dimmed())
    }

    /// Numbered summary of past turns, oldest first
    pub fn format_history<'a>(turns: impl Iterator<Item = &'a ConversationTurn>) -> String {
        let mut output = String::new();
        for (i, turn) in turns.enumerate() {
            let marker = if turn.succeeded { "v".green() } else { "x".red() };
            output.push_str(&format!(
                "{:>3}. {} {}\n",
                i + 1,
                marker,
                preview(&turn.user_input, 80).bold()
            ));
            if let Some(tool) = &turn.tool_used {
                output.push_str(&format!("     {} {}\n", "tool:".dimmed(), tool));
            }
            output.push_str(&format!(
                "     {}\n",
                preview(turn.display_text().lines().next().unwrap_or_default(), 100)
            ));
        }
        if output.is_empty() {
            output.push_str("No messages yet.\n");
        }
        output
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_turn(&self, turn: &ConversationTurn) -> String {
        let mut output = if turn.succeeded {
            turn.display_text().to_string()
        } else {
            format!("{} {}", "Error:".red().bold(), turn.display_text())
        };

        if self.show_details {
            output.push('\n');
            output.push_str(&Self::turn_details(turn));
        }
        output
    }

    fn format_tools(&self, tools: &[ToolDescriptor]) -> String {
        if tools.is_empty() {
            return "No tools available.".to_string();
        }

        let mut output = format!(
            "{}\n",
            format!("Available tools ({}):", tools.len()).cyan().bold()
        );
        for tool in tools {
            output.push_str(&format!("\n  {}", tool.name.yellow().bold()));
            if !tool.description.is_empty() {
                output.push_str(&format!(" - {}", tool.description));
            }
            output.push('\n');

            for (name, spec) in &tool.parameters {
                let required = if spec.required {
                    " (required)".to_string()
                } else {
                    String::new()
                };
                output.push_str(&format!(
                    "      {}: {}{}",
                    name,
                    spec.param_type.as_str(),
                    required.dimmed()
                ));
                if let Some(description) = &spec.description {
                    output.push_str(&format!("  {}", description.dimmed()));
                }
                output.push('\n');
            }
        }
        output
    }

    fn format_tool_result(&self, result: &ToolInvocationResult) -> String {
        if !result.succeeded() {
            return format!(
                "{} {} failed: {}",
                "x".red().bold(),
                result.tool_name(),
                result.raw_error().unwrap_or("unknown error")
            );
        }

        let text = result.joined_text();
        let body = if !text.trim().is_empty() {
            text
        } else if let Some(structured) = result.structured_content() {
            serde_json::to_string_pretty(structured).unwrap_or_default()
        } else {
            "(no content)".to_string()
        };

        let mut output = format!("{} {}", "v".green().bold(), result.tool_name().bold());
        if let Some(ms) = result.duration_ms() {
            output.push_str(&format!(" {}", format!("({} ms)", ms).dimmed()));
        }
        output.push('\n');
        output.push_str(&Self::indent(&body, "  "));
        output
    }

    fn format_status(&self, status: &SessionStatus) -> String {
        let transport = status
            .transport
            .map(|t| t.to_string())
            .unwrap_or_else(|| "none".to_string());
        [
            format!("{} {}", "State:    ".cyan(), status.state),
            format!("{} {}", "Transport:".cyan(), transport),
            format!("{} {}", "Endpoint: ".cyan(), status.endpoint),
            format!("{} {}", "Tools:    ".cyan(), status.tool_count),
            format!("{} {}", "Model:    ".cyan(), status.model),
        ]
        .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use concierge_domain::{
        ContentItem, IntentSelection, OrchestratorState, ParameterSpec, ParameterType,
        ToolArguments, TransportKind,
    };

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_successful_turn_shows_reply() {
        plain();
        let turn = ConversationTurn::direct_reply(
            "Hello",
            IntentSelection::no_tool("greeting"),
            "Hi there!",
        );
        assert_eq!(ConsoleFormatter::new().format_turn(&turn), "Hi there!");
    }

    #[test]
    fn test_failed_turn_shows_error() {
        plain();
        let turn = ConversationTurn::failed("x", "input rejected", "User input is empty");
        let output = ConsoleFormatter::new().format_turn(&turn);
        assert!(output.contains("Error:"));
        assert!(output.contains("User input is empty"));
    }

    #[test]
    fn test_details() {
        plain();
        let selection = IntentSelection::tool(
            "greet",
            ToolArguments::new().with("name", "Ana"),
            "User wants a greeting",
        );
        let result = ToolInvocationResult::success("greet", vec![ContentItem::text("Hello, Ana!")]);
        let turn = ConversationTurn::tool_success("Greet Ana", selection, result, "Hello, Ana!")
            .with_duration_ms(42);

        let output = ConsoleFormatter::new().with_details(true).format_turn(&turn);
        assert!(output.starts_with("Hello, Ana!\n"));
        assert!(output.contains("tool: greet {\"name\":\"Ana\"}"));
        assert!(output.contains("reasoning: User wants a greeting"));
        assert!(output.contains("42 ms"));
    }

    #[test]
    fn test_tool_listing() {
        plain();
        let tools = vec![
            ToolDescriptor::new("get_products", "List products in a price range")
                .with_parameter("minPrice", ParameterSpec::new(ParameterType::Number, false))
                .with_parameter(
                    "category",
                    ParameterSpec::new(ParameterType::String, true)
                        .with_description("Product category"),
                ),
        ];
        let output = ConsoleFormatter::new().format_tools(&tools);
        assert!(output.contains("Available tools (1):"));
        assert!(output.contains("get_products - List products in a price range"));
        assert!(output.contains("category: string (required)  Product category"));
        assert!(output.contains("minPrice: number\n"));

        assert_eq!(ConsoleFormatter::new().format_tools(&[]), "No tools available.");
    }

    #[test]
    fn test_tool_result() {
        plain();
        let ok = ToolInvocationResult::success("greet", vec![ContentItem::text("Hello!")])
            .with_duration_ms(7);
        let output = ConsoleFormatter::new().format_tool_result(&ok);
        assert!(output.contains("greet (7 ms)"));
        assert!(output.contains("  Hello!"));

        let failed = ToolInvocationResult::failure("greet", "Unknown tool 'greet'");
        assert!(
            ConsoleFormatter::new()
                .format_tool_result(&failed)
                .contains("greet failed: Unknown tool 'greet'")
        );
    }

    #[test]
    fn test_status() {
        plain();
        let status = SessionStatus {
            state: OrchestratorState::Ready,
            transport: Some(TransportKind::Sse),
            endpoint: "http://localhost:3001/mcp".into(),
            tool_count: 3,
            model: "gemini-2.5-flash".into(),
        };
        let output = ConsoleFormatter::new().format_status(&status);
        assert!(output.contains("Transport: sse"));
        assert!(output.contains("Tools:     3"));
    }

    #[test]
    fn test_history() {
        plain();
        let turns = [
            ConversationTurn::direct_reply("Hi", IntentSelection::no_tool("greeting"), "Hello!"),
            ConversationTurn::failed("List", "error in tool selection", "timed out"),
        ];
        let output = ConsoleFormatter::format_history(turns.iter());
        assert!(output.contains("  1. v Hi"));
        assert!(output.contains("  2. x List"));
        assert!(output.contains("timed out"));

        assert_eq!(
            ConsoleFormatter::format_history(std::iter::empty()),
            "No messages yet.\n"
        );
    }
}
