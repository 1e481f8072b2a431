//! Command handlers.

pub mod agents;
pub mod history;
pub mod prompt;
