//! SQLite implementation of AssetStore

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension, params};

use super::SqliteStore;
use crate::storage::helper::unix_timestamp;
use crate::storage::ids::AssetId;
use crate::storage::traits::AssetStore;
use crate::storage::types::{Asset, Stored, StoredAsset};

pub(crate) fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS assets (
            id TEXT PRIMARY KEY,
            filename TEXT NOT NULL,
            mimetype TEXT NOT NULL,
            size INTEGER NOT NULL,
            width INTEGER,
            height INTEGER,
            url TEXT NOT NULL,
            created_at INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_assets_created ON assets(created_at);
        "#,
    )?;
    Ok(())
}

#[async_trait]
impl AssetStore for SqliteStore {
    async fn create_asset(&self, asset: Asset) -> Result<AssetId> {
        let conn = self.conn()?;
        let id = AssetId::new();

        conn.execute(
            "INSERT INTO assets (id, filename, mimetype, size, width, height, url, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                id,
                asset.filename,
                asset.mimetype,
                asset.size,
                asset.width,
                asset.height,
                asset.url,
                unix_timestamp()
            ],
        )?;

        Ok(id)
    }

    async fn get(&self, id: &AssetId) -> Result<Option<StoredAsset>> {
        let conn = self.conn()?;
        let asset = conn
            .query_row(
                "SELECT filename, mimetype, size, width, height, url, created_at
                 FROM assets WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Stored::new(
                        id.clone(),
                        Asset {
                            filename: row.get(0)?,
                            mimetype: row.get(1)?,
                            size: row.get(2)?,
                            width: row.get(3)?,
                            height: row.get(4)?,
                            url: row.get(5)?,
                        },
                        row.get(6)?,
                    ))
                },
            )
            .optional()?;
        Ok(asset)
    }

    async fn exists(&self, id: &AssetId) -> Result<bool> {
        let conn = self.conn()?;
        let exists = conn
            .query_row("SELECT 1 FROM assets WHERE id = ?1", params![id], |_| Ok(()))
            .optional()?
            .is_some();
        Ok(exists)
    }

    async fn delete(&self, id: &AssetId) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM assets WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }
}
