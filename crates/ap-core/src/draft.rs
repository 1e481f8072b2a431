//! Draft types: unpromoted local edits and their reconciliation against
//! the authoritative prompt content.

use serde::{Deserialize, Serialize};

use crate::prompt::ResourceId;

// ---------------------------------------------------------------------------
// Draft
// ---------------------------------------------------------------------------

/// Raw text shadowing the authoritative content of one resource.
/// Drafts are not versioned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub resource_id: ResourceId,
    pub text: String,
}

// ---------------------------------------------------------------------------
// ReconciliationState
// ---------------------------------------------------------------------------

/// Derived relationship between editor text, stored draft and
/// authoritative content. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconciliationState {
    /// Editor text matches the authoritative content.
    Clean,
    /// Editor text is persisted as the local draft but not promoted.
    LocalOnly,
    /// Editor text differs from the server and nothing newer is stored locally.
    Unsynced,
    /// A local draft exists and the editor holds newer edits on top of it.
    Divergent,
}

/// Compute the reconciliation state from its three inputs.
///
/// Precedence: an editor matching the server is always `Clean`, an editor
/// matching the stored draft is `LocalOnly`, a stored draft that differs
/// from both is `Divergent`, anything else is `Unsynced`.
pub fn reconcile(authoritative: &str, draft: Option<&str>, editor: &str) -> ReconciliationState {
    if editor == authoritative {
        return ReconciliationState::Clean;
    }
    match draft {
        Some(d) if d == editor => ReconciliationState::LocalOnly,
        Some(d) if d != authoritative => ReconciliationState::Divergent,
        _ => ReconciliationState::Unsynced,
    }
}

impl ReconciliationState {
    /// Editor text differs from the authoritative content.
    pub fn has_server_changes(self) -> bool {
        !matches!(self, Self::Clean)
    }

    /// Editor text differs from what is stored locally.
    pub fn has_unpersisted_edits(self) -> bool {
        matches!(self, Self::Unsynced | Self::Divergent)
    }

    /// A stored draft that differs from the server can be discarded.
    pub fn can_discard(self) -> bool {
        matches!(self, Self::LocalOnly | Self::Divergent)
    }

    pub fn can_promote(self) -> bool {
        self.has_server_changes()
    }

    /// Short banner text for display surfaces.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Clean => "in sync with the server version",
            Self::LocalOnly => "changes saved locally, not yet promoted",
            Self::Unsynced => "unsaved changes to the server version",
            Self::Divergent => "both local and server versions have changes",
        }
    }
}
