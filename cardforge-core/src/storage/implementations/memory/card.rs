//! In-memory CardStore implementation

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

use super::lock;
use crate::storage::helper::unix_timestamp;
use crate::storage::ids::CardId;
use crate::storage::traits::CardStore;
use crate::storage::types::{Card, Editable, Stored, StoredCard};

/// In-memory card store
#[derive(Debug, Default)]
pub struct MemoryCardStore {
    cards: Mutex<HashMap<CardId, StoredCard>>,
}

impl MemoryCardStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CardStore for MemoryCardStore {
    async fn create_card(&self, card: Card) -> Result<CardId> {
        let id = CardId::new();
        let now = unix_timestamp();
        let stored = Stored::new(id.clone(), Editable::new(card, now), now);
        lock(&self.cards)?.insert(id.clone(), stored);
        Ok(id)
    }

    async fn get_card(&self, id: &CardId) -> Result<Option<StoredCard>> {
        Ok(lock(&self.cards)?.get(id).cloned())
    }

    async fn update_card_data(&self, id: &CardId, data: Value) -> Result<bool> {
        let mut cards = lock(&self.cards)?;
        Ok(match cards.get_mut(id) {
            Some(card) => {
                card.content.data = data;
                card.content.updated_at = unix_timestamp();
                true
            }
            None => false,
        })
    }

    async fn delete_card(&self, id: &CardId) -> Result<bool> {
        Ok(lock(&self.cards)?.remove(id).is_some())
    }
}
