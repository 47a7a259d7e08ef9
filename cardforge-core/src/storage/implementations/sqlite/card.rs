//! SQLite implementation of CardStore

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension, params};
use serde_json::Value;

use super::{SqliteStore, json_column_error};
use crate::storage::helper::unix_timestamp;
use crate::storage::ids::CardId;
use crate::storage::traits::CardStore;
use crate::storage::types::{Card, CardSpec, Editable, Stored, StoredCard};

pub(crate) fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS cards (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            spec TEXT NOT NULL,
            data TEXT NOT NULL,
            actor_count INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );
        "#,
    )?;
    Ok(())
}

#[async_trait]
impl CardStore for SqliteStore {
    async fn create_card(&self, card: Card) -> Result<CardId> {
        let conn = self.conn()?;
        let id = CardId::new();
        let now = unix_timestamp();

        conn.execute(
            "INSERT INTO cards (id, name, spec, data, actor_count, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            params![
                id,
                card.name,
                card.spec.to_string(),
                serde_json::to_string(&card.data)?,
                card.actor_count,
                now
            ],
        )?;

        Ok(id)
    }

    async fn get_card(&self, id: &CardId) -> Result<Option<StoredCard>> {
        let conn = self.conn()?;
        let card = conn
            .query_row(
                "SELECT name, spec, data, actor_count, created_at, updated_at
                 FROM cards WHERE id = ?1",
                params![id],
                |row| {
                    let spec: String = row.get(1)?;
                    let data: String = row.get(2)?;
                    let data: Value =
                        serde_json::from_str(&data).map_err(|e| json_column_error(2, e))?;
                    let card = Card {
                        name: row.get(0)?,
                        spec: spec.parse().unwrap_or(CardSpec::Other(spec)),
                        data,
                        actor_count: row.get(3)?,
                    };
                    Ok(Stored::new(
                        id.clone(),
                        Editable::new(card, row.get(5)?),
                        row.get(4)?,
                    ))
                },
            )
            .optional()?;
        Ok(card)
    }

    async fn update_card_data(&self, id: &CardId, data: Value) -> Result<bool> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE cards SET data = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, serde_json::to_string(&data)?, unix_timestamp()],
        )?;
        Ok(updated > 0)
    }

    async fn delete_card(&self, id: &CardId) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM cards WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }
}
