//! ap-providers: Clients for the external services the playground talks to.
//!
//! - `opik`: prompt content and version creation
//! - `openai`: change descriptions via chat completions
//! - `agents`: agent catalog and agent runs

pub mod agents;
pub mod openai;
pub mod opik;
pub mod traits;

pub use agents::AgentApiClient;
pub use openai::OpenAiDescriber;
pub use opik::OpikClient;
pub use traits::{AgentCatalog, ChangeDescriber, PromptSource, VersionCreator};

use ap_core::config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(String),
    #[error("API error (HTTP {status}): {body}")]
    Api { status: u16, body: String },
    #[error("response parse failed: {0}")]
    Parse(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        ProviderError::Http(e.to_string())
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Turn a non-2xx response into `ProviderError::Api` carrying the body.
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> ProviderResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ProviderError::Api {
        status: status.as_u16(),
        body,
    })
}
