//! Conversation domain module

pub mod entities;
pub mod history;
