//! Agent API client — lists playground agents and runs them.

use crate::traits::AgentCatalog;
use crate::{check_status, ProviderError, ProviderResult};
use ap_core::agent::{Agent, AgentRunInput, AgentRunResult};
use ap_core::config::{AgentApiConfig, ConfigError};
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use std::time::Instant;

#[derive(Debug, Deserialize)]
struct AgentListResponse {
    #[serde(default)]
    agents: Vec<Agent>,
}

pub struct AgentApiClient {
    http: HttpClient,
    base_url: String,
    api_key: String,
    org_id: String,
    access_token: Option<String>,
}

impl AgentApiClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        org_id: impl Into<String>,
        access_token: Option<String>,
    ) -> ProviderResult<Self> {
        // Redirects usually mean a missing trailing slash; fail instead of following.
        let http = HttpClient::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            org_id: org_id.into(),
            access_token,
        })
    }

    pub fn from_config(config: &AgentApiConfig) -> ProviderResult<Self> {
        let base_url = config
            .base_url
            .as_deref()
            .ok_or(ConfigError::Missing("AGENT_API_BASE_URL"))?;
        let api_key = config
            .api_key
            .as_deref()
            .ok_or(ConfigError::Missing("AGENT_API_KEY"))?;
        let org_id = config
            .org_id
            .as_deref()
            .ok_or(ConfigError::Missing("AGENT_ORG_ID"))?;
        Self::new(base_url, api_key, org_id, config.access_token.clone())
    }
}

/// Build the run URL for an agent endpoint.
///
/// The catalog base may carry an `/api/internal` suffix that run endpoints
/// do not live under. Endpoints always get a leading and trailing slash.
pub fn run_url(base_url: &str, endpoint: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let base = base.strip_suffix("/api/internal").unwrap_or(base);
    let base = base.trim_end_matches('/');

    let mut path = if endpoint.starts_with('/') {
        endpoint.to_string()
    } else {
        format!("/{endpoint}")
    };
    if !path.ends_with('/') {
        path.push('/');
    }
    format!("{base}{path}")
}

#[async_trait]
impl AgentCatalog for AgentApiClient {
    async fn list_agents(&self) -> ProviderResult<Vec<Agent>> {
        let response = self
            .http
            .get(format!("{}/agents", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("x-organization-id", &self.org_id)
            .header("Accept", "application/json")
            .send()
            .await?;
        let response = check_status(response).await?;

        let list: AgentListResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        let total = list.agents.len();
        let agents: Vec<Agent> = list
            .agents
            .into_iter()
            .filter(|a| a.playground_mode)
            .collect();
        tracing::debug!("Agent catalog: {} of {total} agents enabled for playground", agents.len());
        Ok(agents)
    }

    async fn run_agent(&self, agent: &Agent, inputs: &AgentRunInput) -> AgentRunResult {
        let url = run_url(&self.base_url, &agent.endpoint);
        tracing::info!("Running agent {} at {url}", agent.name);

        let started = Instant::now();
        let mut request = self
            .http
            .post(&url)
            .header("Content-Type", "application/json")
            .json(inputs);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let outcome = async {
            let response = check_status(request.send().await?).await?;
            let text = response.text().await?;
            Ok::<_, ProviderError>(
                serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text)),
            )
        }
        .await;

        let elapsed = started.elapsed().as_millis() as u64;
        match outcome {
            Ok(data) => AgentRunResult::ok(data, elapsed),
            Err(e) => {
                tracing::warn!("Agent run failed for {}: {e}", agent.name);
                AgentRunResult::failed(e.to_string(), elapsed)
            }
        }
    }
}
