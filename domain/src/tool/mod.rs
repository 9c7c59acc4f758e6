//! Tool domain module
//!
//! Descriptors of tools advertised by the tool server, the catalog that
//! holds them, argument values and invocation results.

pub mod catalog;
pub mod entities;
pub mod traits;
pub mod value_objects;
