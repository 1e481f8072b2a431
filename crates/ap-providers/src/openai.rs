//! Change descriptions via an OpenAI-compatible chat completions endpoint.

use crate::traits::ChangeDescriber;
use crate::{check_status, ProviderError, ProviderResult};
use ap_core::config::OpenAiConfig;
use async_trait::async_trait;
use reqwest::Client as HttpClient;

const SYSTEM_PROMPT: &str = "You are a helpful assistant that analyzes prompt changes and \
creates concise, descriptive change summaries. Focus on the key differences and improvements made.";

const MAX_TOKENS: u32 = 150;
const TEMPERATURE: f32 = 0.3;

pub struct OpenAiDescriber {
    http: HttpClient,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiDescriber {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            http: HttpClient::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    pub fn from_config(config: &OpenAiConfig) -> ProviderResult<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .ok_or(ap_core::config::ConfigError::Missing("OPENAI_API_KEY"))?;
        Ok(Self::new(&config.base_url, api_key, &config.model))
    }
}

fn user_prompt(old: &str, new: &str) -> String {
    format!(
        "Please analyze the changes between these two prompts and create a brief change \
description (2-3 lines max):\n\nOLD PROMPT:\n{old}\n\nNEW PROMPT:\n{new}\n\n\
Provide a concise description of what was changed or improved. \
Let the response follow a GitHub style commit message."
    )
}

#[async_trait]
impl ChangeDescriber for OpenAiDescriber {
    async fn describe_change(&self, old: &str, new: &str) -> ProviderResult<String> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": user_prompt(old, new)}
            ],
            "max_tokens": MAX_TOKENS,
            "temperature": TEMPERATURE
        });

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;
        let response = check_status(response).await?;

        let result: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        let text = result["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or("")
            .trim()
            .to_string();

        if text.is_empty() {
            return Err(ProviderError::Parse("completion had no content".into()));
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn user_prompt_embeds_both_versions() {
        let prompt = user_prompt("Hello", "Hi");
        assert!(prompt.contains("OLD PROMPT:\nHello"));
        assert!(prompt.contains("NEW PROMPT:\nHi"));
    }

    #[tokio::test]
    async fn returns_completion_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer sk-test"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4o-mini",
                "max_tokens": 150
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "  Shorten greeting\n"}}]
            })))
            .mount(&server)
            .await;

        let describer = OpenAiDescriber::new(server.uri(), "sk-test", "gpt-4o-mini");
        let text = describer.describe_change("Hello", "Hi").await.unwrap();
        assert_eq!(text, "Shorten greeting");
    }

    #[tokio::test]
    async fn empty_completion_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let describer = OpenAiDescriber::new(server.uri(), "sk-test", "gpt-4o-mini");
        assert!(describer.describe_change("a", "b").await.is_err());
    }

    #[tokio::test]
    async fn rate_limit_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let describer = OpenAiDescriber::new(server.uri(), "sk-test", "gpt-4o-mini");
        let err = describer.describe_change("a", "b").await.unwrap_err();
        assert!(matches!(err, ProviderError::Api { status: 429, .. }));
    }
}
