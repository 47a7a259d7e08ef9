//! In-memory AssetStore implementation

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::lock;
use crate::storage::helper::unix_timestamp;
use crate::storage::ids::AssetId;
use crate::storage::traits::AssetStore;
use crate::storage::types::{Asset, Stored, StoredAsset};

/// In-memory asset store
#[derive(Debug, Default)]
pub struct MemoryAssetStore {
    assets: Mutex<HashMap<AssetId, StoredAsset>>,
}

impl MemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AssetStore for MemoryAssetStore {
    async fn create_asset(&self, asset: Asset) -> Result<AssetId> {
        let id = AssetId::new();
        let stored = Stored::new(id.clone(), asset, unix_timestamp());
        lock(&self.assets)?.insert(id.clone(), stored);
        Ok(id)
    }

    async fn get(&self, id: &AssetId) -> Result<Option<StoredAsset>> {
        Ok(lock(&self.assets)?.get(id).cloned())
    }

    async fn exists(&self, id: &AssetId) -> Result<bool> {
        Ok(lock(&self.assets)?.contains_key(id))
    }

    async fn delete(&self, id: &AssetId) -> Result<bool> {
        Ok(lock(&self.assets)?.remove(id).is_some())
    }
}
