//! Agent catalog types and run results.

use serde::{Deserialize, Serialize};

use crate::prompt::ResourceId;

/// Free-form JSON inputs passed to an agent run.
pub type AgentRunInput = serde_json::Map<String, serde_json::Value>;

// ---------------------------------------------------------------------------
// Agent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub model: String,
    pub endpoint: String,
    #[serde(default)]
    pub capabilities: Option<Vec<String>>,
    #[serde(default)]
    pub model_input_schema: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    pub endpoint_params: Option<serde_json::Map<String, serde_json::Value>>,
    /// Prompt template bound to this agent, if any.
    #[serde(default)]
    pub prompt_id: Option<String>,
    #[serde(default)]
    pub playground_mode: bool,
}

impl Agent {
    pub fn prompt_resource(&self) -> Option<ResourceId> {
        self.prompt_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .map(ResourceId::from)
    }

    /// Case-insensitive match against name, description and model.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&query)
            || self.description.to_lowercase().contains(&query)
            || self.model.to_lowercase().contains(&query)
    }
}

/// Filter agents by a search query. A blank query keeps everything.
pub fn search<'a>(agents: &'a [Agent], query: &str) -> Vec<&'a Agent> {
    agents.iter().filter(|a| a.matches(query)).collect()
}

// ---------------------------------------------------------------------------
// Run result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRunResult {
    pub success: bool,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
    /// Wall-clock time of the run in milliseconds.
    #[serde(default)]
    pub response_time_ms: u64,
}

impl AgentRunResult {
    pub fn ok(data: serde_json::Value, response_time_ms: u64) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            response_time_ms,
        }
    }

    pub fn failed(error: impl Into<String>, response_time_ms: u64) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            response_time_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent(name: &str, description: &str, model: &str) -> Agent {
        Agent {
            id: name.to_lowercase(),
            name: name.into(),
            description: description.into(),
            model: model.into(),
            endpoint: "/agents/run".into(),
            capabilities: None,
            model_input_schema: None,
            endpoint_params: None,
            prompt_id: None,
            playground_mode: true,
        }
    }

    #[test]
    fn search_matches_any_field() {
        let agents = vec![
            agent("Summarizer", "Condenses documents", "gpt-4o"),
            agent("Router", "Routes tickets", "claude-3-haiku"),
        ];
        assert_eq!(search(&agents, "").len(), 2);
        assert_eq!(search(&agents, "  ").len(), 2);
        assert_eq!(search(&agents, "SUMM")[0].name, "Summarizer");
        assert_eq!(search(&agents, "tickets")[0].name, "Router");
        assert_eq!(search(&agents, "haiku")[0].name, "Router");
        assert!(search(&agents, "nothing").is_empty());
    }

    #[test]
    fn deserialize_minimal_agent() {
        let a: Agent = serde_json::from_str(
            r#"{"id": "a1", "name": "Echo", "endpoint": "echo", "prompt_id": "p-9", "playground_mode": true}"#,
        )
        .unwrap();
        assert_eq!(a.prompt_resource(), Some(ResourceId::new("p-9")));
        assert!(a.capabilities.is_none());
    }

    #[test]
    fn empty_prompt_id_is_no_resource() {
        let mut a = agent("Echo", "", "");
        a.prompt_id = Some(String::new());
        assert!(a.prompt_resource().is_none());
    }
}
