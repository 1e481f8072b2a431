//! Draft store: one text draft per prompt, durable across restarts.

use crate::{draft_key, StoreError};
use ap_core::prompt::ResourceId;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

/// Keyed persistence of unpromoted prompt edits.
///
/// `get` never fails: an unreadable entry is reported as absent.
/// `remove` is idempotent.
#[async_trait]
pub trait DraftStore: Send + Sync {
    async fn get(&self, id: &ResourceId) -> Option<String>;

    /// Replace the draft for `id` with `text`.
    async fn set(&self, id: &ResourceId, text: &str) -> Result<(), StoreError>;

    async fn remove(&self, id: &ResourceId) -> Result<(), StoreError>;
}

/// Draft store backed by a single SQLite database.
/// Uses Mutex<Connection> for thread safety (rusqlite::Connection is !Sync).
pub struct SqliteDraftStore {
    conn: Mutex<Connection>,
}

impl SqliteDraftStore {
    /// Open (or create) the draft database at the given path.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::StorageUnavailable(e.to_string()))?;
        }
        let conn = Connection::open(path).map_err(|e| StoreError::Database(e.to_string()))?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Create an in-memory draft store (useful for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn =
            Connection::open_in_memory().map_err(|e| StoreError::Database(e.to_string()))?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    fn initialize_schema(&self) -> Result<(), StoreError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS drafts (
                key TEXT PRIMARY KEY,
                text TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );",
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(())
    }

    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        conn.query_row(
            "SELECT text FROM drafts WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| StoreError::Database(e.to_string()))
    }
}

#[async_trait]
impl DraftStore for SqliteDraftStore {
    async fn get(&self, id: &ResourceId) -> Option<String> {
        let key = draft_key(id);
        match self.read(&key) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Failed to read draft {key}, treating as absent: {e}");
                None
            }
        }
    }

    async fn set(&self, id: &ResourceId, text: &str) -> Result<(), StoreError> {
        let key = draft_key(id);
        let conn = self
            .conn
            .lock()
            .map_err(|e| StoreError::StorageUnavailable(e.to_string()))?;
        conn.execute(
            "INSERT OR REPLACE INTO drafts (key, text, updated_at) VALUES (?1, ?2, ?3)",
            params![key, text, chrono::Utc::now().to_rfc3339()],
        )
        .map_err(|e| StoreError::StorageUnavailable(e.to_string()))?;
        tracing::debug!("Stored draft {key} ({} bytes)", text.len());
        Ok(())
    }

    async fn remove(&self, id: &ResourceId) -> Result<(), StoreError> {
        let key = draft_key(id);
        let conn = self
            .conn
            .lock()
            .map_err(|e| StoreError::StorageUnavailable(e.to_string()))?;
        let removed = conn
            .execute("DELETE FROM drafts WHERE key = ?1", params![key])
            .map_err(|e| StoreError::StorageUnavailable(e.to_string()))?;
        if removed > 0 {
            tracing::debug!("Removed draft {key}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_then_get() {
        let store = SqliteDraftStore::in_memory().unwrap();
        let id = ResourceId::new("p1");

        assert!(store.get(&id).await.is_none());

        store.set(&id, "X").await.unwrap();
        assert_eq!(store.get(&id).await.as_deref(), Some("X"));

        // Second write replaces the first
        store.set(&id, "Y").await.unwrap();
        assert_eq!(store.get(&id).await.as_deref(), Some("Y"));
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let store = SqliteDraftStore::in_memory().unwrap();
        let id = ResourceId::new("p1");

        store.remove(&id).await.unwrap();
        store.set(&id, "draft").await.unwrap();
        store.remove(&id).await.unwrap();
        store.remove(&id).await.unwrap();
        assert!(store.get(&id).await.is_none());
    }

    #[tokio::test]
    async fn drafts_are_keyed_per_resource() {
        let store = SqliteDraftStore::in_memory().unwrap();
        let a = ResourceId::new("a");
        let b = ResourceId::new("b");

        store.set(&a, "alpha").await.unwrap();
        store.set(&b, "beta").await.unwrap();
        store.remove(&a).await.unwrap();

        assert!(store.get(&a).await.is_none());
        assert_eq!(store.get(&b).await.as_deref(), Some("beta"));
    }

    #[tokio::test]
    async fn survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("drafts.db");
        let id = ResourceId::new("p1");

        {
            let store = SqliteDraftStore::open(&path).unwrap();
            store.set(&id, "Hello world").await.unwrap();
        }

        let store = SqliteDraftStore::open(&path).unwrap();
        assert_eq!(store.get(&id).await.as_deref(), Some("Hello world"));
    }
}
