//! ap-core: Shared types for the Agent Playground
//!
//! This crate has zero internal crate dependencies and defines the
//! canonical types used across all other ap-* crates.

pub mod agent;
pub mod config;
pub mod draft;
pub mod history;
pub mod prompt;
pub mod status;

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::agent::{Agent, AgentRunInput, AgentRunResult};
    pub use crate::config::{AutosaveConfig, PlaygroundConfig, PromotionConfig};
    pub use crate::draft::{reconcile, ReconciliationState};
    pub use crate::history::HistoryEntry;
    pub use crate::prompt::{PromptRecord, PromptVersion, ResourceId};
    pub use crate::status::{AutosaveStatus, PromotionState};
}
