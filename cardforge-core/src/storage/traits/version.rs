//! VersionStore trait for card snapshots

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::storage::ids::{CardId, VersionId};
use crate::storage::types::version::VersionSnapshot;

/// Trait for version snapshot storage
///
/// Snapshots are immutable; the only mutation is deletion.
#[async_trait]
pub trait VersionStore: Send + Sync {
    /// Store a snapshot; `version_number` is assigned as `max + 1` per card
    async fn create_version(
        &self,
        card_id: &CardId,
        data: Value,
        message: &str,
    ) -> Result<VersionSnapshot>;

    /// Get a snapshot by ID
    async fn get_version(&self, id: &VersionId) -> Result<Option<VersionSnapshot>>;

    /// List a card's snapshots, ascending by version number
    async fn list_versions(&self, card_id: &CardId) -> Result<Vec<VersionSnapshot>>;

    /// Delete a snapshot
    async fn delete_version(&self, id: &VersionId) -> Result<bool>;
}
