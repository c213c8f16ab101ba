//! SQLite-backed durable device store.
//!
//! Each analysis is stored as one JSON document in a `devices` table. Rows are
//! only ever inserted; nothing updates an analysis after it is written.

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use ecoscan_core::{DeviceAnalysis, DeviceStore, EcoScanError, Result, StoredDevice};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS devices (
     id            TEXT PRIMARY KEY,
     device_name   TEXT NOT NULL,
     analysis_json TEXT NOT NULL,
     created_at    INTEGER NOT NULL
 );
 CREATE INDEX IF NOT EXISTS idx_devices_created ON devices(created_at);";

pub struct SqliteDeviceStore {
    conn: Mutex<Connection>,
}

fn storage_error(context: &str, err: impl std::fmt::Display) -> EcoScanError {
    EcoScanError::persistence(format!("{context}: {err}"))
}

impl SqliteDeviceStore {
    /// Create or open a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())
            .map_err(|e| storage_error("Failed to open SQLite device database", e))?;

        conn.execute_batch(&format!("PRAGMA journal_mode=WAL;\n{SCHEMA}"))
            .map_err(|e| storage_error("Failed to initialize devices schema", e))?;

        info!("SqliteDeviceStore opened at {:?}", path.as_ref());
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Open an in-memory database (for tests).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| storage_error("Failed to open in-memory database", e))?;
        conn.execute_batch(SCHEMA)
            .map_err(|e| storage_error("Failed to initialize devices schema", e))?;
        Ok(Self { conn: Mutex::new(conn) })
    }
}

#[async_trait]
impl DeviceStore for SqliteDeviceStore {
    async fn insert(&self, analysis: &DeviceAnalysis) -> Result<Uuid> {
        let id = Uuid::new_v4();
        let json = serde_json::to_string(analysis)
            .map_err(|e| storage_error("Failed to serialize analysis", e))?;

        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO devices (id, device_name, analysis_json, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                id.to_string(),
                analysis.device_info.name,
                json,
                Utc::now().timestamp_millis(),
            ],
        )
        .map_err(|e| storage_error("Failed to insert device", e))?;
        debug!(device_id = %id, "Inserted device analysis");
        Ok(id)
    }

    async fn get(&self, id: Uuid) -> Result<Option<StoredDevice>> {
        let conn = self.conn.lock().await;
        let row: Option<(String, i64)> = conn
            .query_row(
                "SELECT analysis_json, created_at FROM devices WHERE id = ?1",
                params![id.to_string()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(|e| storage_error("Failed to load device", e))?;

        let Some((json, created_at)) = row else {
            return Ok(None);
        };
        let analysis: DeviceAnalysis = serde_json::from_str(&json)
            .map_err(|e| storage_error("Corrupt analysis document", e))?;
        let created_at = DateTime::<Utc>::from_timestamp_millis(created_at)
            .ok_or_else(|| EcoScanError::persistence("Corrupt created_at timestamp"))?;

        Ok(Some(StoredDevice {
            id,
            analysis,
            created_at,
        }))
    }

    async fn count(&self) -> Result<usize> {
        let conn = self.conn.lock().await;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM devices", [], |row| row.get(0))
            .map_err(|e| storage_error("Failed to count devices", e))?;
        Ok(count as usize)
    }
}
