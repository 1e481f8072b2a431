//! Observable status values for autosave and version promotion.

use serde::{Deserialize, Serialize};

use crate::prompt::{PromptRecord, PromptVersion};

/// Status of the debounced local save for one resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AutosaveStatus {
    #[default]
    Idle,
    Saving,
    Saved,
    Error { message: String },
}

impl AutosaveStatus {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

/// Idle -> Describing -> Creating -> Succeeded | Failed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PromotionState {
    #[default]
    Idle,
    Describing,
    Creating {
        description: String,
    },
    Succeeded {
        record: PromptRecord,
        version: PromptVersion,
    },
    Failed {
        message: String,
    },
}

impl PromotionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded { .. } | Self::Failed { .. })
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Describing | Self::Creating { .. })
    }
}
