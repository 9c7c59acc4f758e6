//! Port for structured conversation logging.
//!
//! Records what happened in each turn (tool selection, tool call, final
//! reply) and connection lifecycle changes as machine-readable events.
//! `tracing` covers diagnostics; this port covers the transcript.

use serde_json::Value;

/// A structured conversation event.
///
/// Known event types: `connected`, `disconnected`, `intent_selected`,
/// `tool_invoked`, `turn_completed`.
pub struct ConversationEvent {
    pub event_type: &'static str,
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Sink for conversation events.
///
/// `log` is synchronous and infallible so a broken log never interrupts a
/// turn; implementations drop events they cannot write.
pub trait ConversationLogger: Send + Sync {
    fn log(&self, event: ConversationEvent);
}

/// Logger that discards everything
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}
