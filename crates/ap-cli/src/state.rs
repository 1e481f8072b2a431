//! Application state shared across all commands.

use anyhow::{Context, Result};
use ap_core::config::{ConfigError, PlaygroundConfig};
use ap_core::prompt::ResourceId;
use ap_editor::{AutosaveScheduler, PromotionWorkflow, PromptSession, Reconciler};
use ap_providers::{
    AgentApiClient, ChangeDescriber, OpenAiDescriber, OpikClient, ProviderError, ProviderResult,
};
use ap_store::{HistoryStore, SqliteDraftStore};
use async_trait::async_trait;
use std::sync::Arc;

pub struct AppState {
    pub config: PlaygroundConfig,

    /// Run history (SQLite).
    pub history: HistoryStore,

    reconciler: Arc<Reconciler>,
    autosave: AutosaveScheduler,
}

impl AppState {
    pub fn new(config: PlaygroundConfig) -> Result<Self> {
        let drafts = SqliteDraftStore::open(&config.drafts_db_path())
            .with_context(|| format!("opening draft store in {}", config.data_dir.display()))?;
        let history = HistoryStore::open(&config.history_db_path())
            .with_context(|| format!("opening run history in {}", config.data_dir.display()))?;

        let reconciler = Arc::new(Reconciler::new(Arc::new(drafts)));
        let autosave = AutosaveScheduler::new(reconciler.clone(), config.autosave.clone());

        Ok(Self {
            config,
            history,
            reconciler,
            autosave,
        })
    }

    pub fn agent_client(&self) -> ProviderResult<AgentApiClient> {
        AgentApiClient::from_config(&self.config.agent_api)
    }

    /// Open an editing session for a prompt. Prompt content and version
    /// creation need Opik credentials; change descriptions degrade to the
    /// fallback text when OpenAI is not configured.
    pub async fn open_prompt(&self, id: ResourceId) -> Result<PromptSession> {
        let opik = Arc::new(
            OpikClient::from_config(&self.config.opik).context("prompt provider not configured")?,
        );

        let describer: Arc<dyn ChangeDescriber> =
            match OpenAiDescriber::from_config(&self.config.openai) {
                Ok(describer) => Arc::new(describer),
                Err(e) => {
                    tracing::warn!("Change descriptions unavailable: {e}");
                    Arc::new(Unconfigured("OPENAI_API_KEY"))
                }
            };

        let promotion = Arc::new(PromotionWorkflow::new(
            describer,
            opik.clone(),
            self.reconciler.clone(),
            self.config.promotion.clone(),
        ));

        let session = PromptSession::open(
            id,
            opik,
            self.reconciler.clone(),
            self.autosave.clone(),
            promotion,
        )
        .await?;
        Ok(session)
    }
}

/// Describer standing in for a provider without credentials.
struct Unconfigured(&'static str);

#[async_trait]
impl ChangeDescriber for Unconfigured {
    async fn describe_change(&self, _old: &str, _new: &str) -> ProviderResult<String> {
        Err(ProviderError::Config(ConfigError::Missing(self.0)))
    }
}
