//! Seams between the editor core and the network.

use async_trait::async_trait;

use crate::ProviderResult;
use ap_core::agent::{Agent, AgentRunInput, AgentRunResult};
use ap_core::prompt::{PromptRecord, PromptVersion, ResourceId};

/// Source of authoritative prompt content.
#[async_trait]
pub trait PromptSource: Send + Sync {
    async fn fetch_prompt(&self, id: &ResourceId) -> ProviderResult<PromptRecord>;
}

/// Creates a new permanent version of a prompt.
#[async_trait]
pub trait VersionCreator: Send + Sync {
    async fn create_version(
        &self,
        id: &ResourceId,
        template: &str,
        change_description: &str,
    ) -> ProviderResult<PromptVersion>;
}

/// Summarizes the difference between two prompt texts.
#[async_trait]
pub trait ChangeDescriber: Send + Sync {
    async fn describe_change(&self, old: &str, new: &str) -> ProviderResult<String>;
}

/// Agent catalog and execution.
#[async_trait]
pub trait AgentCatalog: Send + Sync {
    /// Agents enabled for the playground.
    async fn list_agents(&self) -> ProviderResult<Vec<Agent>>;

    /// Run an agent. Failures are reported inside the result.
    async fn run_agent(&self, agent: &Agent, inputs: &AgentRunInput) -> AgentRunResult;
}
