//! Playground configuration: provider endpoints, credentials and timings.
//!
//! Credentials come from the environment. A missing credential is only an
//! error once the provider that needs it is constructed.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_OPIK_BASE_URL: &str = "https://www.comet.com/opik/api";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaygroundConfig {
    pub opik: OpikConfig,
    pub openai: OpenAiConfig,
    pub agent_api: AgentApiConfig,
    #[serde(default)]
    pub autosave: AutosaveConfig,
    #[serde(default)]
    pub promotion: PromotionConfig,
    /// Directory holding the draft and history databases.
    pub data_dir: PathBuf,
}

impl PlaygroundConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok().filter(|v| !v.is_empty()))
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = lookup("PLAYGROUND_DATA_DIR")
            .map(PathBuf::from)
            .or_else(|| dirs::data_dir().map(|p| p.join("agent-playground")))
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            opik: OpikConfig {
                base_url: lookup("OPIK_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_OPIK_BASE_URL.into()),
                api_key: lookup("OPIK_API_KEY"),
                workspace: lookup("OPIK_WORKSPACE"),
            },
            openai: OpenAiConfig {
                base_url: lookup("OPENAI_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.into()),
                api_key: lookup("OPENAI_API_KEY"),
                model: lookup("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.into()),
            },
            agent_api: AgentApiConfig {
                base_url: lookup("AGENT_API_BASE_URL"),
                api_key: lookup("AGENT_API_KEY"),
                org_id: lookup("AGENT_ORG_ID"),
                access_token: lookup("AGENT_ACCESS_TOKEN"),
            },
            autosave: AutosaveConfig::default(),
            promotion: PromotionConfig::default(),
            data_dir,
        }
    }

    pub fn drafts_db_path(&self) -> PathBuf {
        self.data_dir.join("drafts.db")
    }

    pub fn history_db_path(&self) -> PathBuf {
        self.data_dir.join("history.db")
    }
}

// ---------------------------------------------------------------------------
// Provider configs
// ---------------------------------------------------------------------------

/// Prompt-management provider (content fetch and version creation).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpikConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub workspace: Option<String>,
}

impl OpikConfig {
    /// Returns `(api_key, workspace)` or the first missing variable.
    pub fn credentials(&self) -> Result<(&str, &str), ConfigError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(ConfigError::Missing("OPIK_API_KEY"))?;
        let workspace = self
            .workspace
            .as_deref()
            .ok_or(ConfigError::Missing("OPIK_WORKSPACE"))?;
        Ok((key, workspace))
    }
}

/// LLM completion provider used for change descriptions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    pub model: String,
}

/// Internal agent catalog/execution API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentApiConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub org_id: Option<String>,
    /// Bearer token of the signed-in user, used for agent runs.
    #[serde(default)]
    pub access_token: Option<String>,
}

// ---------------------------------------------------------------------------
// Timings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutosaveConfig {
    /// Quiet period before an edit is persisted.
    pub debounce_ms: u64,
    /// How long `Saved` stays visible before resetting to `Idle`.
    pub saved_display_ms: u64,
    /// How long `Error` stays visible before resetting to `Idle`.
    pub error_display_ms: u64,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 1000,
            saved_display_ms: 2000,
            error_display_ms: 3000,
        }
    }
}

impl AutosaveConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn saved_display(&self) -> Duration {
        Duration::from_millis(self.saved_display_ms)
    }

    pub fn error_display(&self) -> Duration {
        Duration::from_millis(self.error_display_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromotionConfig {
    /// Upper bound on the change-description call.
    pub describe_timeout_ms: u64,
}

impl Default for PromotionConfig {
    fn default() -> Self {
        Self {
            describe_timeout_ms: 20_000,
        }
    }
}

impl PromotionConfig {
    pub fn describe_timeout(&self) -> Duration {
        Duration::from_millis(self.describe_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = PlaygroundConfig::from_lookup(lookup_from(&[("PLAYGROUND_DATA_DIR", "/tmp/ap")]));
        assert_eq!(config.opik.base_url, DEFAULT_OPIK_BASE_URL);
        assert_eq!(config.openai.model, DEFAULT_OPENAI_MODEL);
        assert_eq!(config.autosave.debounce(), Duration::from_millis(1000));
        assert_eq!(config.drafts_db_path(), PathBuf::from("/tmp/ap/drafts.db"));
        assert_eq!(
            config.opik.credentials(),
            Err(ConfigError::Missing("OPIK_API_KEY"))
        );
    }

    #[test]
    fn credentials_from_environment() {
        let config = PlaygroundConfig::from_lookup(lookup_from(&[
            ("OPIK_API_KEY", "key"),
            ("OPIK_WORKSPACE", "team"),
            ("OPENAI_MODEL", "gpt-4o"),
        ]));
        assert_eq!(config.opik.credentials(), Ok(("key", "team")));
        assert_eq!(config.openai.model, "gpt-4o");
    }

    #[test]
    fn missing_workspace_reported() {
        let config = PlaygroundConfig::from_lookup(lookup_from(&[("OPIK_API_KEY", "key")]));
        assert_eq!(
            config.opik.credentials(),
            Err(ConfigError::Missing("OPIK_WORKSPACE"))
        );
    }
}
