//! Prompt types — the editable resource and the versions created from it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Content used when the prompt provider cannot be reached.
pub const PLACEHOLDER_CONTENT: &str =
    "# Prompt\n\nThis is a default prompt. Please edit it as needed.";

// ---------------------------------------------------------------------------
// ResourceId
// ---------------------------------------------------------------------------

/// Opaque identifier of a prompt template owned by the prompt provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ResourceId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// ---------------------------------------------------------------------------
// PromptRecord
// ---------------------------------------------------------------------------

/// Server-of-record view of a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptRecord {
    pub id: ResourceId,
    pub name: String,
    /// Template text of the latest version.
    pub content: String,
    /// Monotonic version counter assigned by the provider.
    pub version: u64,
}

impl PromptRecord {
    /// Synthesized record used when the provider is unreachable.
    pub fn placeholder(id: &ResourceId) -> Self {
        Self {
            id: id.clone(),
            name: format!("Prompt {id}"),
            content: PLACEHOLDER_CONTENT.to_string(),
            version: 1,
        }
    }

    /// The record that results from promoting `content` on top of this one.
    pub fn promoted(&self, content: impl Into<String>) -> Self {
        Self {
            id: self.id.clone(),
            name: self.name.clone(),
            content: content.into(),
            version: self.version + 1,
        }
    }
}

// ---------------------------------------------------------------------------
// PromptVersion
// ---------------------------------------------------------------------------

/// Opaque version record returned after a successful promotion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptVersion {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub prompt_id: Option<String>,
    #[serde(default)]
    pub commit: Option<String>,
    #[serde(default)]
    pub template: String,
    #[serde(default)]
    pub change_description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_is_version_one() {
        let record = PromptRecord::placeholder(&ResourceId::new("abc"));
        assert_eq!(record.version, 1);
        assert_eq!(record.name, "Prompt abc");
        assert_eq!(record.content, PLACEHOLDER_CONTENT);
    }

    #[test]
    fn promoted_bumps_version() {
        let record = PromptRecord {
            id: "p1".into(),
            name: "Support".into(),
            content: "Hello".into(),
            version: 4,
        };
        let next = record.promoted("Hi");
        assert_eq!(next.version, 5);
        assert_eq!(next.content, "Hi");
        assert_eq!(next.name, "Support");
    }

    #[test]
    fn version_tolerates_sparse_payload() {
        let v: PromptVersion =
            serde_json::from_str(r#"{"template": "Hi", "commit": "a1b2"}"#).unwrap();
        assert_eq!(v.commit.as_deref(), Some("a1b2"));
        assert!(v.change_description.is_empty());
    }
}
