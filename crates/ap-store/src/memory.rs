//! In-memory draft store with an optional byte quota.

use crate::{draft_key, DraftStore, StoreError};
use ap_core::prompt::ResourceId;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Non-durable draft store. With a quota, writes that would push the total
/// stored text above it fail with `StorageUnavailable`.
#[derive(Debug, Default)]
pub struct MemoryDraftStore {
    entries: Mutex<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DraftStore for MemoryDraftStore {
    async fn get(&self, id: &ResourceId) -> Option<String> {
        let entries = self.entries.lock().ok()?;
        entries.get(&draft_key(id)).cloned()
    }

    async fn set(&self, id: &ResourceId, text: &str) -> Result<(), StoreError> {
        let key = draft_key(id);
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StoreError::StorageUnavailable(e.to_string()))?;

        if let Some(quota) = self.quota_bytes {
            let others: usize = entries
                .iter()
                .filter(|(k, _)| **k != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = others + key.len() + text.len();
            if needed > quota {
                return Err(StoreError::StorageUnavailable(format!(
                    "quota exceeded: {needed} > {quota} bytes"
                )));
            }
        }

        entries.insert(key, text.to_string());
        Ok(())
    }

    async fn remove(&self, id: &ResourceId) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StoreError::StorageUnavailable(e.to_string()))?;
        entries.remove(&draft_key(id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn round_trip() {
        let store = MemoryDraftStore::new();
        let id = ResourceId::new("r");
        store.set(&id, "X").await.unwrap();
        assert_eq!(store.get(&id).await.as_deref(), Some("X"));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn quota_rejects_oversized_write_and_keeps_previous() {
        // "prompt_r" is 8 bytes; 8 + 4 fits in 12.
        let store = MemoryDraftStore::with_quota(12);
        let id = ResourceId::new("r");

        store.set(&id, "abcd").await.unwrap();
        let err = store.set(&id, "abcde").await.unwrap_err();
        assert!(matches!(err, StoreError::StorageUnavailable(_)));
        assert_eq!(store.get(&id).await.as_deref(), Some("abcd"));
    }

    #[tokio::test]
    async fn replacing_an_entry_frees_its_space() {
        let store = MemoryDraftStore::with_quota(12);
        let id = ResourceId::new("r");
        store.set(&id, "abcd").await.unwrap();
        store.set(&id, "wxyz").await.unwrap();
        store.remove(&id).await.unwrap();
        assert!(store.is_empty());
    }
}
