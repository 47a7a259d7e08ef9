//! In-memory VersionStore implementation

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

use super::lock;
use crate::storage::helper::{json_hash, unix_timestamp};
use crate::storage::ids::{CardId, VersionId};
use crate::storage::traits::VersionStore;
use crate::storage::types::VersionSnapshot;

/// In-memory version store
#[derive(Debug, Default)]
pub struct MemoryVersionStore {
    versions: Mutex<HashMap<VersionId, VersionSnapshot>>,
}

impl MemoryVersionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VersionStore for MemoryVersionStore {
    async fn create_version(
        &self,
        card_id: &CardId,
        data: Value,
        message: &str,
    ) -> Result<VersionSnapshot> {
        let mut versions = lock(&self.versions)?;
        let version_number = versions
            .values()
            .filter(|v| &v.card_id == card_id)
            .map(|v| v.version_number)
            .max()
            .map(|n| n + 1)
            .unwrap_or(1);

        let snapshot = VersionSnapshot {
            id: VersionId::new(),
            card_id: card_id.clone(),
            version_number,
            message: message.to_string(),
            content_hash: json_hash(&data),
            data,
            created_at: unix_timestamp(),
        };
        versions.insert(snapshot.id.clone(), snapshot.clone());
        Ok(snapshot)
    }

    async fn get_version(&self, id: &VersionId) -> Result<Option<VersionSnapshot>> {
        Ok(lock(&self.versions)?.get(id).cloned())
    }

    async fn list_versions(&self, card_id: &CardId) -> Result<Vec<VersionSnapshot>> {
        let versions = lock(&self.versions)?;
        let mut result: Vec<_> = versions
            .values()
            .filter(|v| &v.card_id == card_id)
            .cloned()
            .collect();
        result.sort_by_key(|v| v.version_number);
        Ok(result)
    }

    async fn delete_version(&self, id: &VersionId) -> Result<bool> {
        Ok(lock(&self.versions)?.remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_version_numbers_per_card() {
        let store = MemoryVersionStore::new();
        let a = CardId::from_string("a");
        let b = CardId::from_string("b");

        let v1 = store.create_version(&a, json!({"n": 1}), "first").await.unwrap();
        let v2 = store.create_version(&a, json!({"n": 2}), "second").await.unwrap();
        let other = store.create_version(&b, json!({"n": 1}), "other").await.unwrap();

        assert_eq!(v1.version_number, 1);
        assert_eq!(v2.version_number, 2);
        assert_eq!(other.version_number, 1);
        assert_eq!(v1.content_hash, other.content_hash);

        let listed = store.list_versions(&a).await.unwrap();
        let numbers: Vec<_> = listed.iter().map(|v| v.version_number).collect();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_delete_does_not_reuse_numbers_below_max() {
        let store = MemoryVersionStore::new();
        let card = CardId::from_string("a");
        let v1 = store.create_version(&card, json!({}), "one").await.unwrap();
        let v2 = store.create_version(&card, json!({}), "two").await.unwrap();

        assert!(store.delete_version(&v1.id).await.unwrap());
        let v3 = store.create_version(&card, json!({}), "three").await.unwrap();
        assert_eq!(v3.version_number, v2.version_number + 1);
        assert!(store.get_version(&v1.id).await.unwrap().is_none());
    }
}
