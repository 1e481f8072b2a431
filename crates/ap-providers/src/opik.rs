//! Prompt-management client — fetches prompt content and creates versions.

use crate::traits::{PromptSource, VersionCreator};
use crate::{check_status, ProviderError, ProviderResult};
use ap_core::config::OpikConfig;
use ap_core::prompt::{PromptRecord, PromptVersion, ResourceId};
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Deserialize;

/// Prompt as returned by `GET /v1/private/prompts/{id}`.
#[derive(Debug, Clone, Deserialize)]
struct RemotePrompt {
    id: String,
    name: String,
    #[serde(default)]
    version_count: u64,
    #[serde(default)]
    latest_version: Option<RemoteVersion>,
}

#[derive(Debug, Clone, Deserialize)]
struct RemoteVersion {
    #[serde(default)]
    template: String,
}

pub struct OpikClient {
    http: HttpClient,
    base_url: String,
    api_key: String,
    workspace: String,
}

impl OpikClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        workspace: impl Into<String>,
    ) -> Self {
        Self {
            http: HttpClient::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            workspace: workspace.into(),
        }
    }

    pub fn from_config(config: &OpikConfig) -> ProviderResult<Self> {
        let (api_key, workspace) = config.credentials()?;
        Ok(Self::new(&config.base_url, api_key, workspace))
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .header("authorization", &self.api_key)
            .header("Comet-Workspace", &self.workspace)
            .header("Accept", "application/json")
            .header("Cache-Control", "no-cache, no-store, must-revalidate")
            .header("Pragma", "no-cache")
    }

    async fn get_prompt(&self, id: &ResourceId) -> ProviderResult<RemotePrompt> {
        let path = format!("/v1/private/prompts/{}", urlencoding::encode(id.as_str()));
        let response = self.request(reqwest::Method::GET, &path).send().await?;
        let response = check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))
    }
}

#[async_trait]
impl PromptSource for OpikClient {
    async fn fetch_prompt(&self, id: &ResourceId) -> ProviderResult<PromptRecord> {
        let prompt = self.get_prompt(id).await?;
        Ok(PromptRecord {
            id: ResourceId::new(prompt.id),
            name: prompt.name,
            content: prompt
                .latest_version
                .map(|v| v.template)
                .unwrap_or_default(),
            version: prompt.version_count,
        })
    }
}

#[async_trait]
impl VersionCreator for OpikClient {
    async fn create_version(
        &self,
        id: &ResourceId,
        template: &str,
        change_description: &str,
    ) -> ProviderResult<PromptVersion> {
        // Versions are addressed by prompt name, not id.
        let prompt = self.get_prompt(id).await?;

        let body = serde_json::json!({
            "name": prompt.name,
            "version": {
                "template": template,
                "change_description": change_description,
            }
        });

        let response = self
            .request(reqwest::Method::POST, "/v1/private/prompts/versions")
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;
        let response = check_status(response).await?;

        let text = response.text().await?;
        let version = serde_json::from_str::<PromptVersion>(&text)
            .ok()
            .filter(|v| !v.template.is_empty())
            .unwrap_or_else(|| {
                tracing::debug!("Version response carried no record, synthesizing one");
                PromptVersion {
                    prompt_id: Some(prompt.id.clone()),
                    template: template.to_string(),
                    change_description: change_description.to_string(),
                    ..Default::default()
                }
            });

        tracing::info!("Created version for prompt {} ({})", prompt.name, id);
        Ok(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn prompt_body() -> serde_json::Value {
        serde_json::json!({
            "id": "p-1",
            "name": "support-agent",
            "description": "",
            "tags": [],
            "version_count": 3,
            "latest_version": {
                "id": "v-3",
                "prompt_id": "p-1",
                "template": "Hello",
                "commit": "abc123",
                "change_description": "init"
            }
        })
    }

    #[tokio::test]
    async fn fetches_prompt_with_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/private/prompts/p-1"))
            .and(header("authorization", "secret"))
            .and(header("Comet-Workspace", "team"))
            .respond_with(ResponseTemplate::new(200).set_body_json(prompt_body()))
            .mount(&server)
            .await;

        let client = OpikClient::new(server.uri(), "secret", "team");
        let record = client.fetch_prompt(&ResourceId::new("p-1")).await.unwrap();

        assert_eq!(record.name, "support-agent");
        assert_eq!(record.content, "Hello");
        assert_eq!(record.version, 3);
    }

    #[tokio::test]
    async fn missing_prompt_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/private/prompts/nope"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
            .mount(&server)
            .await;

        let client = OpikClient::new(server.uri(), "secret", "team");
        let err = client
            .fetch_prompt(&ResourceId::new("nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Api { status: 404, .. }));
    }

    #[tokio::test]
    async fn creates_version_by_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/private/prompts/p-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(prompt_body()))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/private/prompts/versions"))
            .and(body_partial_json(serde_json::json!({
                "name": "support-agent",
                "version": {"template": "Hi", "change_description": "Shorter greeting"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "v-4",
                "prompt_id": "p-1",
                "template": "Hi",
                "commit": "def456",
                "change_description": "Shorter greeting"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = OpikClient::new(server.uri(), "secret", "team");
        let version = client
            .create_version(&ResourceId::new("p-1"), "Hi", "Shorter greeting")
            .await
            .unwrap();

        assert_eq!(version.id.as_deref(), Some("v-4"));
        assert_eq!(version.commit.as_deref(), Some("def456"));
    }

    #[tokio::test]
    async fn empty_create_response_is_synthesized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/private/prompts/p-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(prompt_body()))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/private/prompts/versions"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = OpikClient::new(server.uri(), "secret", "team");
        let version = client
            .create_version(&ResourceId::new("p-1"), "Hi", "desc")
            .await
            .unwrap();
        assert_eq!(version.template, "Hi");
        assert_eq!(version.prompt_id.as_deref(), Some("p-1"));
    }

    #[tokio::test]
    async fn rejected_version_surfaces_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/private/prompts/p-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(prompt_body()))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/private/prompts/versions"))
            .respond_with(ResponseTemplate::new(409).set_body_string("template unchanged"))
            .mount(&server)
            .await;

        let client = OpikClient::new(server.uri(), "secret", "team");
        let err = client
            .create_version(&ResourceId::new("p-1"), "Hello", "desc")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("template unchanged"));
    }

    #[test]
    fn from_config_requires_credentials() {
        let config = OpikConfig {
            base_url: "http://localhost".into(),
            api_key: None,
            workspace: Some("team".into()),
        };
        assert!(matches!(
            OpikClient::from_config(&config),
            Err(ProviderError::Config(_))
        ));
    }
}
