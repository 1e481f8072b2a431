//! ap-store: Draft and run-history persistence.
//!
//! Drafts live in a single keyed store with one entry per prompt; writes
//! replace the whole entry. History keeps the most recent agent runs.

pub mod draft;
pub mod history;
pub mod memory;

pub use draft::{DraftStore, SqliteDraftStore};
pub use history::HistoryStore;
pub use memory::MemoryDraftStore;

use ap_core::prompt::ResourceId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The medium is full or cannot be written.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("database error: {0}")]
    Database(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Storage key for the draft of `id`.
pub fn draft_key(id: &ResourceId) -> String {
    if id.is_empty() {
        "prompt_default".to_string()
    } else {
        format!("prompt_{id}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_derivation() {
        assert_eq!(draft_key(&ResourceId::new("01J-abc")), "prompt_01J-abc");
        assert_eq!(draft_key(&ResourceId::new("")), "prompt_default");
    }
}
