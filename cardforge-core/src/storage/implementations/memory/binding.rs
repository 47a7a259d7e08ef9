//! In-memory BindingStore implementation

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::lock;
use crate::storage::ids::{BindingId, CardId};
use crate::storage::traits::BindingStore;
use crate::storage::types::{BindingPatch, CardAssetBinding, NewBinding};

/// In-memory binding store
#[derive(Debug, Default)]
pub struct MemoryBindingStore {
    bindings: Mutex<HashMap<BindingId, CardAssetBinding>>,
}

impl MemoryBindingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fully-formed binding row, bypassing order assignment
    ///
    /// Used to seed inconsistent states (duplicate orders, duplicate main
    /// flags) that concurrent writers can leave behind.
    pub fn insert_raw(&self, binding: CardAssetBinding) -> Result<()> {
        lock(&self.bindings)?.insert(binding.id.clone(), binding);
        Ok(())
    }
}

#[async_trait]
impl BindingStore for MemoryBindingStore {
    async fn list_bindings_by_card(&self, card_id: &CardId) -> Result<Vec<CardAssetBinding>> {
        let bindings = lock(&self.bindings)?;
        let mut result: Vec<_> = bindings
            .values()
            .filter(|b| &b.card_id == card_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
        Ok(result)
    }

    async fn get_binding(&self, id: &BindingId) -> Result<Option<CardAssetBinding>> {
        Ok(lock(&self.bindings)?.get(id).cloned())
    }

    async fn create_binding(&self, binding: NewBinding) -> Result<CardAssetBinding> {
        let mut bindings = lock(&self.bindings)?;
        let order = bindings
            .values()
            .filter(|b| b.card_id == binding.card_id)
            .map(|b| b.order)
            .max()
            .map(|n| n + 1)
            .unwrap_or(0);

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
        bindings.insert(created.id.clone(), created.clone());
        Ok(created)
    }

    async fn update_binding(
        &self,
        id: &BindingId,
        patch: BindingPatch,
    ) -> Result<Option<CardAssetBinding>> {
        let mut bindings = lock(&self.bindings)?;
        Ok(bindings.get_mut(id).map(|binding| {
            patch.apply_to(binding);
            binding.clone()
        }))
    }

    async fn delete_binding(&self, id: &BindingId) -> Result<bool> {
        Ok(lock(&self.bindings)?.remove(id).is_some())
    }
}
