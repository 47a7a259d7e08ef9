//! AssetStore trait for asset metadata storage

use anyhow::Result;
use async_trait::async_trait;

use crate::storage::ids::AssetId;
use crate::storage::types::asset::{Asset, StoredAsset};

/// Trait for asset storage operations
///
/// Assets are owned by the storage subsystem; the graph only holds their ids.
/// Binary content lives elsewhere, this trait manages metadata.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Create a new asset record and return its generated id
    async fn create_asset(&self, asset: Asset) -> Result<AssetId>;

    /// Get an asset by ID
    async fn get(&self, id: &AssetId) -> Result<Option<StoredAsset>>;

    /// Check if an asset exists
    async fn exists(&self, id: &AssetId) -> Result<bool>;

    /// Delete an asset record
    ///
    /// Bindings referencing the asset are left in place and show up as
    /// broken nodes in the asset graph.
    async fn delete(&self, id: &AssetId) -> Result<bool>;
}
