//! Progress display while a turn is processed

pub mod reporter;
