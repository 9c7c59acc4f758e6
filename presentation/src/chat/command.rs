//! Parsing of REPL input lines

/// Turns shown by `/history` when no count is given
pub const DEFAULT_HISTORY_SHOWN: usize = 10;

/// One line of REPL input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// Plain text for the orchestrator
    Message(String),
    Help,
    Tools,
    Status,
    /// `/call <tool> [json]`
    Call { tool: String, args: Option<String> },
    /// `/history [n]`
    History(usize),
    Reconnect,
    Quit,
    /// A slash command that was not understood, with the reason
    Invalid(String),
}

impl ReplCommand {
    /// Parse a trimmed, non-empty line.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if !line.starts_with('/') {
            return ReplCommand::Message(line.to_string());
        }

        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };

        match name {
            "/quit" | "/exit" | "/q" => ReplCommand::Quit,
            "/help" | "/h" | "/?" => ReplCommand::Help,
            "/tools" => ReplCommand::Tools,
            "/status" => ReplCommand::Status,
            "/reconnect" => ReplCommand::Reconnect,
            "/history" if rest.is_empty() => ReplCommand::History(DEFAULT_HISTORY_SHOWN),
            "/history" => match rest.parse::<usize>() {
                Ok(n) if n > 0 => ReplCommand::History(n),
                _ => ReplCommand::Invalid(format!("'{}' is not a positive number", rest)),
            },
            "/call" if rest.is_empty() => {
                ReplCommand::Invalid("usage: /call <tool> [json arguments]".to_string())
            }
            "/call" => {
                let (tool, args) = match rest.split_once(char::is_whitespace) {
                    Some((tool, args)) => (tool, Some(args.trim().to_string())),
                    None => (rest, None),
                };
                ReplCommand::Call {
                    tool: tool.to_string(),
                    args: args.filter(|a| !a.is_empty()),
                }
            }
            other => ReplCommand::Invalid(format!("Unknown command: {}", other)),
        }
    }
}
