//! SQLite implementation of BindingStore

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::collections::BTreeSet;

use super::{SqliteStore, json_column_error};
use crate::storage::ids::{BindingId, CardId};
use crate::storage::traits::BindingStore;
use crate::storage::types::{BindingPatch, CardAssetBinding, NewBinding};

pub(crate) fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS card_assets (
            id TEXT PRIMARY KEY,
            card_id TEXT NOT NULL,
            asset_id TEXT NOT NULL,
            role TEXT NOT NULL,
            name TEXT NOT NULL,
            ext TEXT NOT NULL,
            sort_order INTEGER NOT NULL,
            is_main INTEGER NOT NULL DEFAULT 0,
            tags TEXT NOT NULL DEFAULT '[]'
        );

        CREATE INDEX IF NOT EXISTS idx_card_assets_card ON card_assets(card_id, sort_order);
        CREATE INDEX IF NOT EXISTS idx_card_assets_asset ON card_assets(asset_id);
        "#,
    )?;
    Ok(())
}

const BINDING_COLUMNS: &str = "id, card_id, asset_id, role, name, ext, sort_order, is_main, tags";

fn binding_from_row(row: &Row<'_>) -> rusqlite::Result<CardAssetBinding> {
    let tags: String = row.get(8)?;
    let tags: BTreeSet<String> =
        serde_json::from_str(&tags).map_err(|e| json_column_error(8, e))?;
    Ok(CardAssetBinding {
        id: row.get(0)?,
        card_id: row.get(1)?,
        asset_id: row.get(2)?,
        role: row.get(3)?,
        name: row.get(4)?,
        ext: row.get(5)?,
        order: row.get(6)?,
        is_main: row.get::<_, i32>(7)? != 0,
        tags,
    })
}

fn get_binding_sync(conn: &Connection, id: &BindingId) -> Result<Option<CardAssetBinding>> {
    let binding = conn
        .query_row(
            &format!("SELECT {BINDING_COLUMNS} FROM card_assets WHERE id = ?1"),
            params![id],
            binding_from_row,
        )
        .optional()?;
    Ok(binding)
}

/// Read-modify-write of one binding row
fn update_binding_sync(
    conn: &Connection,
    id: &BindingId,
    patch: &BindingPatch,
) -> Result<Option<CardAssetBinding>> {
    let Some(mut binding) = get_binding_sync(conn, id)? else {
        return Ok(None);
    };
    patch.apply_to(&mut binding);

    conn.execute(
        "UPDATE card_assets
         SET role = ?2, name = ?3, sort_order = ?4, is_main = ?5, tags = ?6
         WHERE id = ?1",
        params![
            binding.id,
            binding.role,
            binding.name,
            binding.order,
            binding.is_main as i32,
            serde_json::to_string(&binding.tags)?
        ],
    )?;
    Ok(Some(binding))
}

#[async_trait]
impl BindingStore for SqliteStore {
    async fn list_bindings_by_card(&self, card_id: &CardId) -> Result<Vec<CardAssetBinding>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {BINDING_COLUMNS} FROM card_assets WHERE card_id = ?1 ORDER BY sort_order, id"
        ))?;
        let bindings = stmt
            .query_map(params![card_id], binding_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(bindings)
    }

    async fn get_binding(&self, id: &BindingId) -> Result<Option<CardAssetBinding>> {
        let conn = self.conn()?;
        get_binding_sync(&conn, id)
    }

    async fn create_binding(&self, binding: NewBinding) -> Result<CardAssetBinding> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let order: i64 = tx.query_row(
            "SELECT COALESCE(MAX(sort_order) + 1, 0) FROM card_assets WHERE card_id = ?1",
            params![binding.card_id],
            |row| row.get(0),
        )?;

        let created = CardAssetBinding {
            id: BindingId::new(),
            card_id: binding.card_id,
            asset_id: binding.asset_id,
            role: binding.role,
            name: binding.name,
            ext: binding.ext.to_lowercase(),
            order,
            is_main: binding.is_main,
            tags: binding.tags,
        };

        tx.execute(
            &format!(
                "INSERT INTO card_assets ({BINDING_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
            ),
            params![
                created.id,
                created.card_id,
                created.asset_id,
                created.role,
                created.name,
                created.ext,
                created.order,
                created.is_main as i32,
                serde_json::to_string(&created.tags)?
            ],
        )?;
        tx.commit()?;

        Ok(created)
    }

    async fn update_binding(
        &self,
        id: &BindingId,
        patch: BindingPatch,
    ) -> Result<Option<CardAssetBinding>> {
        let conn = self.conn()?;
        update_binding_sync(&conn, id, &patch)
    }

    async fn update_bindings(&self, batch: Vec<(BindingId, BindingPatch)>) -> Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let mut updated = 0;
        for (id, patch) in &batch {
            if update_binding_sync(&tx, id, patch)?.is_some() {
                updated += 1;
            }
        }
        tx.commit()?;
        Ok(updated)
    }

    async fn delete_binding(&self, id: &BindingId) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM card_assets WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ids::AssetId;
    use crate::storage::types::binding::actor_tag;

    #[tokio::test]
    async fn test_create_list_update() {
        let store = SqliteStore::in_memory().unwrap();
        let card = CardId::from_string("c1");

        let a = store
            .create_binding(
                NewBinding::new(card.clone(), AssetId::new(), "icon", "neutral")
                    .with_ext("PNG")
                    .with_tag("emotion:neutral"),
            )
            .await
            .unwrap();
        let b = store
            .create_binding(NewBinding::new(card.clone(), AssetId::new(), "icon", "smile").main())
            .await
            .unwrap();
        assert_eq!((a.order, b.order), (0, 1));
        assert_eq!(a.ext, "png");

        let updated = store
            .update_binding(
                &a.id,
                BindingPatch {
                    tags: Some([actor_tag(2)].into_iter().collect()),
                    order: Some(5),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.actor(), Some(2));

        let listed = store.list_bindings_by_card(&card).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].name, "smile");
        assert!(listed[0].is_main);
        assert_eq!(listed[1].order, 5);
        assert!(listed[1].tags.contains("actor:2"));
    }

    #[tokio::test]
    async fn test_batch_update_counts_found_rows() {
        let store = SqliteStore::in_memory().unwrap();
        let card = CardId::from_string("c1");
        let a = store
            .create_binding(NewBinding::new(card.clone(), AssetId::new(), "background", "a"))
            .await
            .unwrap();

        let updated = store
            .update_bindings(vec![
                (a.id.clone(), BindingPatch { is_main: Some(true), ..Default::default() }),
                (BindingId::from_string("ghost"), BindingPatch { is_main: Some(true), ..Default::default() }),
            ])
            .await
            .unwrap();
        assert_eq!(updated, 1);
        assert!(store.get_binding(&a.id).await.unwrap().unwrap().is_main);
    }

    #[tokio::test]
    async fn test_delete_binding() {
        let store = SqliteStore::in_memory().unwrap();
        let card = CardId::from_string("c1");
        let a = store
            .create_binding(NewBinding::new(card.clone(), AssetId::new(), "sound", "a"))
            .await
            .unwrap();
        assert!(store.delete_binding(&a.id).await.unwrap());
        assert!(store.get_binding(&a.id).await.unwrap().is_none());
        assert!(!store.delete_binding(&a.id).await.unwrap());
    }
}
