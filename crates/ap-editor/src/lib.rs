//! ap-editor: Prompt editing core.
//!
//! Pipeline: Reconciler (draft vs. server) → AutosaveScheduler (debounced
//! local writes) → PromotionWorkflow (describe the diff, create a version).
//! `PromptSession` binds the three to one open prompt.

pub mod autosave;
pub mod promotion;
pub mod reconciler;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use autosave::AutosaveScheduler;
pub use promotion::{PromotionRequest, PromotionWorkflow, FALLBACK_DESCRIPTION};
pub use reconciler::Reconciler;
pub use session::{fetch_or_placeholder, PromptSession};

use ap_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("prompt has no changes to promote")]
    NothingToPromote,
    #[error("prompt id is empty")]
    EmptyResourceId,
}
