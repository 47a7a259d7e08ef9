//! SQLite implementation of VersionStore

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde_json::Value;

use super::{SqliteStore, json_column_error};
use crate::storage::helper::{json_hash, unix_timestamp};
use crate::storage::ids::{CardId, VersionId};
use crate::storage::traits::VersionStore;
use crate::storage::types::VersionSnapshot;

pub(crate) fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS card_versions (
            id TEXT PRIMARY KEY,
            card_id TEXT NOT NULL,
            version_number INTEGER NOT NULL,
            message TEXT NOT NULL,
            data TEXT NOT NULL,
            content_hash TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            UNIQUE(card_id, version_number)
        );
        "#,
    )?;
    Ok(())
}

const VERSION_COLUMNS: &str =
    "id, card_id, version_number, message, data, content_hash, created_at";

fn version_from_row(row: &Row<'_>) -> rusqlite::Result<VersionSnapshot> {
    let data: String = row.get(4)?;
    let data: Value = serde_json::from_str(&data).map_err(|e| json_column_error(4, e))?;
    Ok(VersionSnapshot {
        id: row.get(0)?,
        card_id: row.get(1)?,
        version_number: row.get(2)?,
        message: row.get(3)?,
        data,
        content_hash: row.get(5)?,
        created_at: row.get(6)?,
    })
}

#[async_trait]
impl VersionStore for SqliteStore {
    async fn create_version(
        &self,
        card_id: &CardId,
        data: Value,
        message: &str,
    ) -> Result<VersionSnapshot> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let version_number: i64 = tx.query_row(
            "SELECT COALESCE(MAX(version_number) + 1, 1) FROM card_versions WHERE card_id = ?1",
            params![card_id],
            |row| row.get(0),
        )?;

        let snapshot = VersionSnapshot {
            id: VersionId::new(),
            card_id: card_id.clone(),
            version_number,
            message: message.to_string(),
            content_hash: json_hash(&data),
            data,
            created_at: unix_timestamp(),
        };

        tx.execute(
            &format!("INSERT INTO card_versions ({VERSION_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
            params![
                snapshot.id,
                snapshot.card_id,
                snapshot.version_number,
                snapshot.message,
                serde_json::to_string(&snapshot.data)?,
                snapshot.content_hash,
                snapshot.created_at
            ],
        )?;
        tx.commit()?;

        Ok(snapshot)
    }

    async fn get_version(&self, id: &VersionId) -> Result<Option<VersionSnapshot>> {
        let conn = self.conn()?;
        let version = conn
            .query_row(
                &format!("SELECT {VERSION_COLUMNS} FROM card_versions WHERE id = ?1"),
                params![id],
                version_from_row,
            )
            .optional()?;
        Ok(version)
    }

    async fn list_versions(&self, card_id: &CardId) -> Result<Vec<VersionSnapshot>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {VERSION_COLUMNS} FROM card_versions WHERE card_id = ?1 ORDER BY version_number"
        ))?;
        let versions = stmt
            .query_map(params![card_id], version_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(versions)
    }

    async fn delete_version(&self, id: &VersionId) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM card_versions WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }
}
