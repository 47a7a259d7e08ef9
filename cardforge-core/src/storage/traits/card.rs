//! CardStore trait for card documents

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::storage::ids::CardId;
use crate::storage::types::card::{Card, StoredCard};

/// Trait for card storage operations
#[async_trait]
pub trait CardStore: Send + Sync {
    /// Create a new card and return its generated id
    async fn create_card(&self, card: Card) -> Result<CardId>;

    /// Get a card by ID
    async fn get_card(&self, id: &CardId) -> Result<Option<StoredCard>>;

    /// Replace the card's data payload; returns false if the card does not exist
    async fn update_card_data(&self, id: &CardId, data: Value) -> Result<bool>;

    /// Delete a card
    async fn delete_card(&self, id: &CardId) -> Result<bool>;
}
