//! Run history entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::agent::{AgentRunInput, AgentRunResult};

/// Maximum number of entries kept in the run history.
pub const MAX_HISTORY: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub agent_id: String,
    pub agent_name: String,
    pub timestamp: DateTime<Utc>,
    pub inputs: AgentRunInput,
    pub result: AgentRunResult,
}

impl HistoryEntry {
    pub fn new(
        agent_id: impl Into<String>,
        agent_name: impl Into<String>,
        inputs: AgentRunInput,
        result: AgentRunResult,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            agent_id: agent_id.into(),
            agent_name: agent_name.into(),
            timestamp: Utc::now(),
            inputs,
            result,
        }
    }
}
