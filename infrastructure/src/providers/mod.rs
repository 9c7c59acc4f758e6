//! Language model providers implementing the LLM gateway port

pub mod gemini;

pub use gemini::GeminiGateway;
