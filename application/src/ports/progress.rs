//! Progress notification port
//!
//! Defines the interface for reporting progress while a turn is processed.

use concierge_domain::{ConversationTurn, IntentSelection};

/// Callback for progress updates during one turn
///
/// Implementations live in the presentation layer (spinners, status lines).
/// Every method has an empty default so notifiers only implement what they show.
pub trait TurnProgressNotifier: Send + Sync {
    /// The model is being asked which tool to use
    fn on_intent_start(&self) {}

    /// The model has picked a tool, or decided none is needed
    fn on_intent_resolved(&self, _selection: &IntentSelection) {}

    /// A tool call is about to be sent
    fn on_tool_start(&self, _tool: &str) {}

    /// A tool call finished
    fn on_tool_complete(&self, _tool: &str, _succeeded: bool) {}

    /// The model is writing the final reply
    fn on_compose_start(&self) {}

    /// The turn is finished, successfully or not
    fn on_turn_complete(&self, _turn: &ConversationTurn) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl TurnProgressNotifier for NoProgress {}
