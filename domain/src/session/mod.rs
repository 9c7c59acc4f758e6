//! Session domain module
//!
//! Connection lifecycle vocabulary shared by the transports and the
//! orchestrator.

pub mod entities;
