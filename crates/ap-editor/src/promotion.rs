//! Version Promotion Workflow.
//!
//! `Idle -> Describing -> Creating -> Succeeded | Failed`
//!
//! The change description is best-effort and falls back to a fixed string.
//! Version creation is the only fatal step; on failure the draft is kept.

use crate::reconciler::Reconciler;
use ap_core::config::PromotionConfig;
use ap_core::prompt::{PromptRecord, ResourceId};
use ap_core::status::PromotionState;
use ap_providers::{ChangeDescriber, VersionCreator};
use std::sync::Arc;
use tokio::sync::watch;

pub const FALLBACK_DESCRIPTION: &str = "Updated prompt content";

#[derive(Debug, Clone)]
pub struct PromotionRequest {
    pub resource_id: ResourceId,
    /// Editor text to promote.
    pub text: String,
    /// Authoritative record at the start of the run.
    pub previous: PromptRecord,
}

pub struct PromotionWorkflow {
    describer: Arc<dyn ChangeDescriber>,
    creator: Arc<dyn VersionCreator>,
    reconciler: Arc<Reconciler>,
    config: PromotionConfig,
}

impl PromotionWorkflow {
    pub fn new(
        describer: Arc<dyn ChangeDescriber>,
        creator: Arc<dyn VersionCreator>,
        reconciler: Arc<Reconciler>,
        config: PromotionConfig,
    ) -> Self {
        Self {
            describer,
            creator,
            reconciler,
            config,
        }
    }

    /// Run to completion and return the terminal state.
    pub async fn promote(&self, request: PromotionRequest) -> PromotionState {
        let (tx, _rx) = watch::channel(PromotionState::Idle);
        self.run(request, &tx).await
    }

    /// Run in the background. The receiver observes every transition;
    /// dropping it does not stop the run.
    pub fn spawn(self: &Arc<Self>, request: PromotionRequest) -> watch::Receiver<PromotionState> {
        let (tx, rx) = watch::channel(PromotionState::Idle);
        let workflow = Arc::clone(self);
        tokio::spawn(async move {
            workflow.run(request, &tx).await;
        });
        rx
    }

    pub async fn run(
        &self,
        request: PromotionRequest,
        states: &watch::Sender<PromotionState>,
    ) -> PromotionState {
        let PromotionRequest {
            resource_id,
            text,
            previous,
        } = request;

        tracing::info!("Promoting {resource_id}: describing change");
        states.send_replace(PromotionState::Describing);
        let description = self.describe(&resource_id, &previous.content, &text).await;

        tracing::info!("Promoting {resource_id}: creating version");
        states.send_replace(PromotionState::Creating {
            description: description.clone(),
        });

        let terminal = match self
            .creator
            .create_version(&resource_id, &text, &description)
            .await
        {
            Ok(version) => {
                if let Err(e) = self.reconciler.complete_promotion(&resource_id).await {
                    tracing::warn!("Version created but draft for {resource_id} not cleared: {e}");
                }
                tracing::info!(
                    "Promoted {resource_id} to version {}",
                    version.id.as_deref().unwrap_or("?")
                );
                PromotionState::Succeeded {
                    record: previous.promoted(text),
                    version,
                }
            }
            Err(e) => {
                tracing::warn!("Version creation failed for {resource_id}: {e}");
                PromotionState::Failed {
                    message: e.to_string(),
                }
            }
        };

        states.send_replace(terminal.clone());
        terminal
    }

    async fn describe(&self, id: &ResourceId, old: &str, new: &str) -> String {
        let call = self.describer.describe_change(old, new);
        match tokio::time::timeout(self.config.describe_timeout(), call).await {
            Ok(Ok(description)) if !description.trim().is_empty() => description,
            Ok(Ok(_)) => {
                tracing::warn!("Empty change description for {id}, using fallback");
                FALLBACK_DESCRIPTION.to_string()
            }
            Ok(Err(e)) => {
                tracing::warn!("Change description failed for {id}: {e}, using fallback");
                FALLBACK_DESCRIPTION.to_string()
            }
            Err(_) => {
                tracing::warn!("Change description timed out for {id}, using fallback");
                FALLBACK_DESCRIPTION.to_string()
            }
        }
    }
}
