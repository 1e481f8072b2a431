//! One open prompt: authoritative record, editor text and the services
//! that reconcile, autosave and promote it.

use crate::autosave::AutosaveScheduler;
use crate::promotion::{PromotionRequest, PromotionWorkflow};
use crate::reconciler::Reconciler;
use crate::EditorError;
use ap_core::draft::ReconciliationState;
use ap_core::prompt::{PromptRecord, ResourceId};
use ap_core::status::{AutosaveStatus, PromotionState};
use ap_providers::PromptSource;
use ap_store::StoreError;
use std::sync::Arc;
use tokio::sync::watch;

/// Fetch the authoritative record, degrading to a placeholder when the
/// provider cannot be reached.
pub async fn fetch_or_placeholder(source: &dyn PromptSource, id: &ResourceId) -> PromptRecord {
    match source.fetch_prompt(id).await {
        Ok(record) => record,
        Err(e) => {
            tracing::warn!("Prompt {id} unavailable ({e}), using placeholder");
            PromptRecord::placeholder(id)
        }
    }
}

pub struct PromptSession {
    id: ResourceId,
    record: PromptRecord,
    editor: String,
    source: Arc<dyn PromptSource>,
    reconciler: Arc<Reconciler>,
    autosave: AutosaveScheduler,
    promotion: Arc<PromotionWorkflow>,
}

impl PromptSession {
    pub async fn open(
        id: ResourceId,
        source: Arc<dyn PromptSource>,
        reconciler: Arc<Reconciler>,
        autosave: AutosaveScheduler,
        promotion: Arc<PromotionWorkflow>,
    ) -> Result<Self, EditorError> {
        if id.is_empty() {
            return Err(EditorError::EmptyResourceId);
        }
        let record = fetch_or_placeholder(source.as_ref(), &id).await;
        let (editor, state) = reconciler.load(&id, &record.content).await;
        tracing::debug!("Opened {id} at version {} ({state:?})", record.version);
        Ok(Self {
            id,
            record,
            editor,
            source,
            reconciler,
            autosave,
            promotion,
        })
    }

    pub fn id(&self) -> &ResourceId {
        &self.id
    }

    pub fn record(&self) -> &PromptRecord {
        &self.record
    }

    pub fn editor_text(&self) -> &str {
        &self.editor
    }

    pub fn autosave_status(&self) -> AutosaveStatus {
        self.autosave.status(&self.id)
    }

    pub async fn state(&self) -> ReconciliationState {
        self.reconciler
            .on_edit(&self.id, &self.record.content, &self.editor)
            .await
    }

    /// The editor shows the server text but a different draft is still
    /// stored. Reopening the prompt would restore that draft.
    pub async fn has_stale_draft(&self) -> bool {
        if self.editor != self.record.content {
            return false;
        }
        matches!(self.reconciler.draft(&self.id).await, Some(d) if d != self.record.content)
    }

    /// Replace the editor text and schedule an autosave.
    pub async fn edit(&mut self, text: impl Into<String>) -> ReconciliationState {
        self.editor = text.into();
        self.autosave
            .notify_edit(&self.id, &self.record.content, &self.editor);
        self.state().await
    }

    /// Re-fetch the authoritative content. The editor text is kept as is;
    /// only the state is recomputed. An unreachable provider keeps the
    /// current record.
    pub async fn refresh(&mut self) -> ReconciliationState {
        match self.source.fetch_prompt(&self.id).await {
            Ok(record) => {
                if record.content != self.record.content {
                    tracing::info!(
                        "Server content for {} changed (version {} -> {})",
                        self.id,
                        self.record.version,
                        record.version
                    );
                }
                self.record = record;
            }
            Err(e) => tracing::warn!("Refresh of {} failed: {e}", self.id),
        }
        self.state().await
    }

    /// Drop the local draft and reset the editor to the server content.
    pub async fn discard(&mut self) -> Result<ReconciliationState, EditorError> {
        self.autosave.cancel(&self.id);
        // Let an in-flight write land before removing it.
        self.autosave.flush(&self.id).await.ok();
        self.editor = self
            .reconciler
            .discard_local(&self.id, &self.record.content)
            .await?;
        Ok(ReconciliationState::Clean)
    }

    /// Promote the editor text to a new server version and wait for the
    /// outcome.
    ///
    /// On success the created version becomes the authoritative record.
    /// On failure the draft and editor text are left untouched.
    pub async fn promote(&mut self) -> Result<PromotionState, EditorError> {
        let mut states = self.start_promotion().await?;
        let terminal = match states.wait_for(PromotionState::is_terminal).await {
            Ok(state) => PromotionState::clone(&state),
            Err(_) => PromotionState::Failed {
                message: "promotion stopped before finishing".into(),
            },
        };
        Ok(self.finish_promotion(terminal).await)
    }

    /// Flush the pending edit and start promoting in the background.
    /// The receiver reports every transition; pass the terminal state to
    /// `finish_promotion`.
    pub async fn start_promotion(&self) -> Result<watch::Receiver<PromotionState>, EditorError> {
        if self.editor == self.record.content {
            return Err(EditorError::NothingToPromote);
        }
        if let Err(e) = self.autosave.flush(&self.id).await {
            tracing::warn!("Could not save draft for {} before promotion: {e}", self.id);
        }

        Ok(self.promotion.spawn(PromotionRequest {
            resource_id: self.id.clone(),
            text: self.editor.clone(),
            previous: self.record.clone(),
        }))
    }

    /// Adopt the outcome of a promotion. A success re-reads the record so
    /// the version number is the one the provider assigned.
    pub async fn finish_promotion(&mut self, state: PromotionState) -> PromotionState {
        let PromotionState::Succeeded {
            record: promoted,
            version,
        } = state
        else {
            return state;
        };

        let record = match self.source.fetch_prompt(&self.id).await {
            Ok(latest) if latest.content == promoted.content => latest,
            Ok(latest) => {
                tracing::debug!("Server record for {} lags the new version", self.id);
                PromptRecord {
                    version: (latest.version + 1).max(promoted.version),
                    ..promoted
                }
            }
            Err(e) => {
                tracing::warn!("Could not re-read {} after promotion: {e}", self.id);
                promoted
            }
        };

        self.record = record.clone();
        self.editor = record.content.clone();
        PromotionState::Succeeded { record, version }
    }

    pub async fn flush(&self) -> Result<(), StoreError> {
        self.autosave.flush(&self.id).await
    }

    /// Leave the prompt. With `flush` the pending edit is written first;
    /// otherwise it is dropped.
    pub async fn close(self, flush: bool) -> Result<(), StoreError> {
        let result = if flush {
            self.autosave.flush(&self.id).await
        } else {
            Ok(())
        };
        self.autosave.cancel(&self.id);
        result
    }
}
