//! SQLite-backed run history, newest first, capped at `MAX_HISTORY` entries.

use crate::StoreError;
use ap_core::history::{HistoryEntry, MAX_HISTORY};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;

pub struct HistoryStore {
    conn: Mutex<Connection>,
    capacity: usize,
}

impl HistoryStore {
    /// Open (or create) the history database at the given path.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::StorageUnavailable(e.to_string()))?;
        }
        let conn = Connection::open(path).map_err(|e| StoreError::Database(e.to_string()))?;
        Self::with_connection(conn, MAX_HISTORY)
    }

    /// Create an in-memory history store (useful for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn =
            Connection::open_in_memory().map_err(|e| StoreError::Database(e.to_string()))?;
        Self::with_connection(conn, MAX_HISTORY)
    }

    fn with_connection(conn: Connection, capacity: usize) -> Result<Self, StoreError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS run_history (
                id TEXT PRIMARY KEY,
                agent_id TEXT NOT NULL,
                agent_name TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                inputs_json TEXT NOT NULL,
                result_json TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_run_history_agent
                ON run_history(agent_id);",
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self {
            conn: Mutex::new(conn),
            capacity,
        })
    }

    /// Record a run and drop the oldest entries beyond capacity.
    pub fn add(&self, entry: &HistoryEntry) -> Result<(), StoreError> {
        let inputs_json = serde_json::to_string(&entry.inputs)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let result_json = serde_json::to_string(&entry.result)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let conn = self
            .conn
            .lock()
            .map_err(|e| StoreError::StorageUnavailable(e.to_string()))?;
        conn.execute(
            "INSERT INTO run_history (id, agent_id, agent_name, timestamp, inputs_json, result_json)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                entry.id.to_string(),
                entry.agent_id,
                entry.agent_name,
                entry.timestamp.to_rfc3339(),
                inputs_json,
                result_json,
            ],
        )
        .map_err(|e| StoreError::StorageUnavailable(e.to_string()))?;

        conn.execute(
            "DELETE FROM run_history WHERE rowid NOT IN (
                SELECT rowid FROM run_history ORDER BY rowid DESC LIMIT ?1
            )",
            params![self.capacity as i64],
        )
        .map_err(|e| StoreError::StorageUnavailable(e.to_string()))?;
        Ok(())
    }

    /// All entries, newest first.
    pub fn list(&self) -> Result<Vec<HistoryEntry>, StoreError> {
        self.query(None)
    }

    /// Entries for one agent, newest first.
    pub fn for_agent(&self, agent_id: &str) -> Result<Vec<HistoryEntry>, StoreError> {
        self.query(Some(agent_id))
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| StoreError::StorageUnavailable(e.to_string()))?;
        conn.execute("DELETE FROM run_history", [])
            .map_err(|e| StoreError::StorageUnavailable(e.to_string()))?;
        Ok(())
    }

    fn query(&self, agent_id: Option<&str>) -> Result<Vec<HistoryEntry>, StoreError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        let mut stmt = conn
            .prepare(
                "SELECT id, agent_id, agent_name, timestamp, inputs_json, result_json
                 FROM run_history
                 WHERE ?1 IS NULL OR agent_id = ?1
                 ORDER BY rowid DESC",
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![agent_id], |row| {
                Ok(RawHistoryRow {
                    id: row.get(0)?,
                    agent_id: row.get(1)?,
                    agent_name: row.get(2)?,
                    timestamp: row.get(3)?,
                    inputs_json: row.get(4)?,
                    result_json: row.get(5)?,
                })
            })
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let mut entries = Vec::new();
        for row in rows {
            let raw = row.map_err(|e| StoreError::Database(e.to_string()))?;
            match raw_to_entry(raw) {
                Ok(entry) => entries.push(entry),
                Err(e) => tracing::warn!("Skipping unreadable history entry: {e}"),
            }
        }
        Ok(entries)
    }
}

/// Internal row struct for SQLite queries.
struct RawHistoryRow {
    id: String,
    agent_id: String,
    agent_name: String,
    timestamp: String,
    inputs_json: String,
    result_json: String,
}

fn raw_to_entry(raw: RawHistoryRow) -> Result<HistoryEntry, StoreError> {
    let parse_err = |field: &str, e: String| StoreError::Serialization(format!("{field}: {e}"));

    Ok(HistoryEntry {
        id: raw
            .id
            .parse()
            .map_err(|e: uuid::Error| parse_err("id", e.to_string()))?,
        agent_id: raw.agent_id,
        agent_name: raw.agent_name,
        timestamp: chrono::DateTime::parse_from_rfc3339(&raw.timestamp)
            .map(|dt| dt.with_timezone(&chrono::Utc))
            .map_err(|e| parse_err("timestamp", e.to_string()))?,
        inputs: serde_json::from_str(&raw.inputs_json)
            .map_err(|e| parse_err("inputs_json", e.to_string()))?,
        result: serde_json::from_str(&raw.result_json)
            .map_err(|e| parse_err("result_json", e.to_string()))?,
    })
}
