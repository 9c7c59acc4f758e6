//! REPL (Read-Eval-Print Loop) for interactive chat

use super::command::ReplCommand;
use crate::config::ReplConfig;
use crate::output::{ConsoleFormatter, OutputFormatter};
use crate::progress::reporter::ProgressReporter;
use colored::Colorize;
use concierge_application::{NoProgress, Orchestrator, OrchestratorError, TurnOptions};
use concierge_domain::{ConversationHistory, MAX_INPUT_CHARS, ToolArguments};
use reedline::{DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal};
use std::sync::Arc;

/// Lines of line-editor history kept on disk
const EDITOR_HISTORY_SIZE: usize = 1000;

/// Interactive chat REPL
pub struct ChatRepl {
    orchestrator: Arc<Orchestrator>,
    formatter: Box<dyn OutputFormatter>,
    config: ReplConfig,
    turn_options: TurnOptions,
    history: ConversationHistory,
}

impl ChatRepl {
    pub fn new(orchestrator: Arc<Orchestrator>, formatter: Box<dyn OutputFormatter>) -> Self {
        Self {
            orchestrator,
            formatter,
            config: ReplConfig::default(),
            turn_options: TurnOptions::default(),
            history: ConversationHistory::default(),
        }
    }

    pub fn with_config(mut self, config: ReplConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_turn_options(mut self, options: TurnOptions) -> Self {
        self.turn_options = options;
        self
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    /// Run the interactive REPL until `/quit` or end of input
    pub async fn run(&mut self) -> std::io::Result<()> {
        let mut editor = Reedline::create();
        if let Some(path) = self.config.history_path() {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            if let Ok(history) = FileBackedHistory::with_file(EDITOR_HISTORY_SIZE, path) {
                editor = editor.with_history(Box::new(history));
            }
        }
        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic("concierge".to_string()),
            DefaultPromptSegment::Empty,
        );

        self.print_welcome().await;

        loop {
            let signal = match editor.read_line(&prompt) {
                Ok(signal) => signal,
                Err(err) => {
                    eprintln!("Error: {}", err);
                    break;
                }
            };

            match signal {
                Signal::Success(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    if self.handle_line(&line).await {
                        break;
                    }
                }
                Signal::CtrlC => {
                    println!("^C");
                }
                _ => {
                    println!("Bye!");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Handle one line. Returns true if the REPL should exit.
    pub async fn handle_line(&mut self, line: &str) -> bool {
        match ReplCommand::parse(line) {
            ReplCommand::Quit => {
                println!("Bye!");
                return true;
            }
            ReplCommand::Help => Self::print_help(),
            ReplCommand::Tools => {
                let tools = self.orchestrator.list_available_tools().await;
                println!("{}\n", self.formatter.format_tools(&tools));
            }
            ReplCommand::Status => {
                let status = self.orchestrator.status().await;
                println!("{}\n", self.formatter.format_status(&status));
            }
            ReplCommand::History(n) => {
                print!("{}", ConsoleFormatter::format_history(self.history.recent(n)));
                println!();
            }
            ReplCommand::Reconnect => self.reconnect().await,
            ReplCommand::Call { tool, args } => self.call_tool(&tool, args.as_deref()).await,
            ReplCommand::Invalid(reason) => {
                println!("{}", reason);
                println!("Type /help for available commands");
            }
            ReplCommand::Message(message) => self.process_message(&message).await,
        }
        false
    }

    async fn process_message(&mut self, message: &str) {
        if message.chars().count() > MAX_INPUT_CHARS {
            println!(
                "{} message is longer than {} characters\n",
                "Error:".red().bold(),
                MAX_INPUT_CHARS
            );
            return;
        }

        let result = if self.config.show_progress {
            let progress = ProgressReporter::new();
            self.orchestrator
                .process_user_input(message, self.turn_options.clone(), &progress)
                .await
        } else {
            self.orchestrator
                .process_user_input(message, self.turn_options.clone(), &NoProgress)
                .await
        };

        match result {
            Ok(turn) => {
                println!("{}\n", self.formatter.format_turn(&turn));
                self.history.push(turn);
            }
            Err(e) => Self::print_orchestrator_error(&e),
        }
    }

    async fn call_tool(&self, tool: &str, args: Option<&str>) {
        let arguments = match args.map(ToolArguments::parse).transpose() {
            Ok(arguments) => arguments.unwrap_or_default(),
            Err(e) => {
                println!("{} {}\n", "Error:".red().bold(), e);
                return;
            }
        };

        match self.orchestrator.execute_tool(tool, &arguments).await {
            Ok(result) => println!("{}\n", self.formatter.format_tool_result(&result)),
            Err(e) => Self::print_orchestrator_error(&e),
        }
    }

    async fn reconnect(&self) {
        println!("Reconnecting...");
        match self.orchestrator.reconnect().await {
            Ok(()) => {
                let status = self.orchestrator.status().await;
                println!("{}\n", self.formatter.format_status(&status));
            }
            Err(e) => println!("{} {}\n", "Reconnect failed:".red().bold(), e),
        }
    }

    fn print_orchestrator_error(error: &OrchestratorError) {
        println!("{} {}", "Error:".red().bold(), error);
        if matches!(error, OrchestratorError::NotConnected) {
            println!("Use /reconnect to connect again");
        }
        println!();
    }

    async fn print_welcome(&self) {
        let status = self.orchestrator.status().await;
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│          tool-concierge - Chat Mode         │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!(
            "Connected to {} via {} ({} tools), model {}",
            status.endpoint,
            status
                .transport
                .map(|t| t.to_string())
                .unwrap_or_else(|| "nothing".to_string()),
            status.tool_count,
            status.model
        );
        println!();
        Self::print_help();
    }

    fn print_help() {
        println!("Commands:");
        println!("  /help, /h, /?          - Show this help");
        println!("  /tools                 - List the server's tools");
        println!("  /status                - Show connection status");
        println!("  /call <tool> [json]    - Call a tool directly");
        println!("  /history [n]           - Show the last n messages");
        println!("  /reconnect             - Reconnect to the tool server");
        println!("  /quit, /exit, /q       - Exit chat");
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::JsonFormatter;
    use async_trait::async_trait;
    use concierge_application::{
        BehaviorConfig, GatewayError, LlmGateway, ToolServerError, ToolServerSession,
        ToolServerTransport, TransportError,
    };
    use concierge_domain::{
        ClientIdentity, ContentItem, ToolDescriptor, ToolInvocationResult, TransportKind,
    };
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct ScriptedGateway {
        replies: Mutex<VecDeque<String>>,
    }

    #[async_trait]
    impl LlmGateway for ScriptedGateway {
        fn model_id(&self) -> &str {
            "scripted"
        }

        async fn generate(&self, _prompt: &str) -> Result<String, GatewayError> {
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or(GatewayError::EmptyResponse)
        }
    }

    struct EchoSession;

    #[async_trait]
    impl ToolServerSession for EchoSession {
        fn kind(&self) -> TransportKind {
            TransportKind::StreamableHttp
        }

        async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ToolServerError> {
            Ok(vec![ToolDescriptor::new("echo", "Repeat the input")])
        }

        async fn call_tool(
            &self,
            name: &str,
            arguments: &ToolArguments,
        ) -> Result<ToolInvocationResult, ToolServerError> {
            Ok(ToolInvocationResult::success(
                name,
                vec![ContentItem::text(arguments.to_json().to_string())],
            ))
        }

        async fn close(&self) -> Result<(), ToolServerError> {
            Ok(())
        }
    }

    struct EchoTransport;

    #[async_trait]
    impl ToolServerTransport for EchoTransport {
        fn kind(&self) -> TransportKind {
            TransportKind::StreamableHttp
        }

        fn endpoint(&self) -> &str {
            "http://localhost:3001/mcp"
        }

        async fn open(
            &self,
            _identity: &ClientIdentity,
        ) -> Result<Box<dyn ToolServerSession>, TransportError> {
            Ok(Box::new(EchoSession))
        }
    }

    async fn repl(replies: &[&str]) -> ChatRepl {
        let gateway = Arc::new(ScriptedGateway {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
        });
        let orchestrator = Orchestrator::new(
            vec![Arc::new(EchoTransport)],
            gateway,
            BehaviorConfig::default(),
        );
        orchestrator.connect().await.unwrap();

        ChatRepl::new(Arc::new(orchestrator), Box::new(JsonFormatter)).with_config(ReplConfig {
            show_progress: false,
            history_file: None,
        })
    }

    #[tokio::test]
    async fn test_messages_are_recorded_in_history() {
        let mut repl = repl(&[
            r#"{"toolName": "echo", "parameters": {"text": "hi"}, "reasoning": "echo it"}"#,
            "The echo tool said hi.",
        ])
        .await;

        assert!(!repl.handle_line("Echo hi").await);
        assert_eq!(repl.history().len(), 1);
        let turn = repl.history().iter().next().unwrap();
        assert_eq!(turn.tool_used.as_deref(), Some("echo"));
        assert_eq!(turn.final_response.as_deref(), Some("The echo tool said hi."));
    }

    #[tokio::test]
    async fn test_overlong_message_never_reaches_orchestrator() {
        let mut repl = repl(&[]).await;
        let message = "x".repeat(MAX_INPUT_CHARS + 1);

        assert!(!repl.handle_line(&message).await);
        assert!(repl.history().is_empty());
    }

    #[tokio::test]
    async fn test_commands_do_not_touch_history() {
        let mut repl = repl(&[]).await;

        assert!(!repl.handle_line("/tools").await);
        assert!(!repl.handle_line("/status").await);
        assert!(!repl.handle_line(r#"/call echo {"a": 1}"#).await);
        assert!(!repl.handle_line("/call echo not-json").await);
        assert!(!repl.handle_line("/history").await);
        assert!(!repl.handle_line("/bogus").await);
        assert!(repl.history().is_empty());

        assert!(repl.handle_line("/quit").await);
    }
}
