//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod compose_response;
pub mod invoke_tool;
pub mod negotiate_transport;
pub mod orchestrator;
pub mod resolve_intent;
