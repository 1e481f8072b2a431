//! Draft Reconciler — the only writer of the draft store.

use ap_core::draft::{reconcile, ReconciliationState};
use ap_core::prompt::ResourceId;
use ap_store::{DraftStore, StoreError};
use std::sync::Arc;

pub struct Reconciler {
    store: Arc<dyn DraftStore>,
}

impl Reconciler {
    pub fn new(store: Arc<dyn DraftStore>) -> Self {
        Self { store }
    }

    /// Initial editor text and state when a prompt is opened.
    ///
    /// A stored draft that differs from the server wins; anything else
    /// opens the authoritative content.
    pub async fn load(
        &self,
        id: &ResourceId,
        authoritative: &str,
    ) -> (String, ReconciliationState) {
        match self.store.get(id).await {
            Some(draft) if draft != authoritative => {
                tracing::debug!("Restoring local draft for {id}");
                (draft, ReconciliationState::LocalOnly)
            }
            _ => (authoritative.to_string(), ReconciliationState::Clean),
        }
    }

    /// Recompute the state for the current editor text. Reads, never writes.
    pub async fn on_edit(
        &self,
        id: &ResourceId,
        authoritative: &str,
        editor: &str,
    ) -> ReconciliationState {
        let draft = self.store.get(id).await;
        reconcile(authoritative, draft.as_deref(), editor)
    }

    pub async fn draft(&self, id: &ResourceId) -> Option<String> {
        self.store.get(id).await
    }

    /// Persist `text` as the draft, replacing any previous one.
    pub async fn commit_draft(&self, id: &ResourceId, text: &str) -> Result<(), StoreError> {
        self.store.set(id, text).await
    }

    /// Drop the local draft. Returns the new editor text.
    pub async fn discard_local(
        &self,
        id: &ResourceId,
        authoritative: &str,
    ) -> Result<String, StoreError> {
        self.store.remove(id).await?;
        tracing::debug!("Discarded local draft for {id}");
        Ok(authoritative.to_string())
    }

    /// Clear the draft after its text became a server version.
    pub async fn complete_promotion(&self, id: &ResourceId) -> Result<(), StoreError> {
        self.store.remove(id).await
    }
}
