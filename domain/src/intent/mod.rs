//! Intent domain module
//!
//! A model's decision about which tool, if any, answers a user request.

pub mod entities;
pub mod parsing;
