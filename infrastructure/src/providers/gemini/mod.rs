//! Google Gemini provider
//!
//! Calls the Generative Language API `generateContent` endpoint with an
//! API key. Each prompt is a single user turn; nothing is remembered
//! between calls.

mod gateway;
mod types;

pub use gateway::GeminiGateway;
