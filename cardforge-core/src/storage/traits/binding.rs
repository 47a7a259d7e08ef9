//! BindingStore trait for card/asset bindings

use anyhow::Result;
use async_trait::async_trait;

use crate::storage::ids::{BindingId, CardId};
use crate::storage::types::binding::{BindingPatch, CardAssetBinding, NewBinding};

/// Trait for binding storage operations
///
/// The store does not enforce the one-main-per-role rule; that is the
/// asset graph's job.
#[async_trait]
pub trait BindingStore: Send + Sync {
    /// List all bindings of a card, ordered by `order`
    async fn list_bindings_by_card(&self, card_id: &CardId) -> Result<Vec<CardAssetBinding>>;

    /// Get a binding by ID
    async fn get_binding(&self, id: &BindingId) -> Result<Option<CardAssetBinding>>;

    /// Create a binding; `order` is assigned as `max(order) + 1` within the card
    async fn create_binding(&self, binding: NewBinding) -> Result<CardAssetBinding>;

    /// Update the given fields; returns `None` if the binding does not exist
    async fn update_binding(
        &self,
        id: &BindingId,
        patch: BindingPatch,
    ) -> Result<Option<CardAssetBinding>>;

    /// Apply several updates as one batch
    ///
    /// Returns how many bindings were found and updated.
    async fn update_bindings(&self, batch: Vec<(BindingId, BindingPatch)>) -> Result<usize> {
        let mut updated = 0;
        for (id, patch) in batch {
            if self.update_binding(&id, patch).await?.is_some() {
                updated += 1;
            }
        }
        Ok(updated)
    }

    /// Delete a binding (the referenced asset is untouched)
    async fn delete_binding(&self, id: &BindingId) -> Result<bool>;
}
