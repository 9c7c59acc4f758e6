//! Progress reporting for turn processing

use colored::Colorize;
use concierge_application::ports::progress::TurnProgressNotifier;
use concierge_domain::{ConversationTurn, IntentSelection};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Spinner on stderr that follows the stages of a turn
pub struct ProgressReporter {
    spinner: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    /// Show `message`, starting the spinner if needed
    fn set_stage(&self, message: String) {
        let mut guard = self.spinner.lock().unwrap_or_else(PoisonError::into_inner);
        let spinner = guard.get_or_insert_with(|| {
            let pb = ProgressBar::new_spinner();
            pb.set_style(Self::spinner_style());
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        });
        spinner.set_message(message);
    }

    fn println(&self, line: String) {
        let guard = self.spinner.lock().unwrap_or_else(PoisonError::into_inner);
        match guard.as_ref() {
            Some(pb) => pb.println(line),
            None => eprintln!("{}", line),
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl TurnProgressNotifier for ProgressReporter {
    fn on_intent_start(&self) {
        self.set_stage("Choosing a tool...".to_string());
    }

    fn on_intent_resolved(&self, selection: &IntentSelection) {
        if let Some(tool) = selection.selected_tool() {
            self.set_stage(format!("Selected {}", tool.bold()));
        }
    }

    fn on_tool_start(&self, tool: &str) {
        self.set_stage(format!("Calling {}...", tool.bold()));
    }

    fn on_tool_complete(&self, tool: &str, succeeded: bool) {
        let mark = if succeeded { "v".green() } else { "x".red() };
        self.println(format!("{} {}", mark, tool));
    }

    fn on_compose_start(&self) {
        self.set_stage("Writing the reply...".to_string());
    }

    fn on_turn_complete(&self, _turn: &ConversationTurn) {
        if let Some(pb) = self
            .spinner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            pb.finish_and_clear();
        }
    }
}

/// Simple text-based progress (no spinner), for non-interactive output
pub struct SimpleProgress;

impl TurnProgressNotifier for SimpleProgress {
    fn on_intent_resolved(&self, selection: &IntentSelection) {
        match selection.selected_tool() {
            Some(tool) => eprintln!("{} {}", "->".cyan(), tool.bold()),
            None => eprintln!("{} {}", "->".cyan(), "no tool".dimmed()),
        }
    }

    fn on_tool_complete(&self, tool: &str, succeeded: bool) {
        if succeeded {
            eprintln!("  {} {}", "v".green(), tool);
        } else {
            eprintln!("  {} {} (failed)", "x".red(), tool);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use concierge_domain::ToolArguments;

    #[test]
    fn test_spinner_lifecycle() {
        let reporter = ProgressReporter::new();
        reporter.on_intent_start();
        reporter.on_intent_resolved(&IntentSelection::tool(
            "greet",
            ToolArguments::new(),
            "greeting requested",
        ));
        reporter.on_tool_start("greet");
        reporter.on_tool_complete("greet", true);
        reporter.on_compose_start();
        assert!(reporter.spinner.lock().unwrap().is_some());

        let turn = ConversationTurn::failed("hi", "r", "e");
        reporter.on_turn_complete(&turn);
        assert!(reporter.spinner.lock().unwrap().is_none());
    }
}
