//! Version history for card payloads
//!
//! Snapshots copy the live card data; diffs are computed on demand with the
//! diff engine, either against the live card or between two snapshots.

use std::marker::PhantomData;
use std::sync::Arc;

use tracing::info;

use crate::diff::{CardDiff, diff_cards};
use crate::error::{CardError, CardResult};
use crate::storage::ids::{CardId, VersionId};
use crate::storage::traits::{CardStore, StorageTypes, Stores, VersionStore};
use crate::storage::types::{StoredCard, VersionInfo, VersionSnapshot};

pub struct VersionHistory<S: StorageTypes> {
    card_store: Arc<S::Card>,
    version_store: Arc<S::Version>,
    _marker: PhantomData<S>,
}

impl<S: StorageTypes> Clone for VersionHistory<S> {
    fn clone(&self) -> Self {
        Self {
            card_store: self.card_store.clone(),
            version_store: self.version_store.clone(),
            _marker: PhantomData,
        }
    }
}

impl<S: StorageTypes> VersionHistory<S> {
    pub fn from_stores(stores: &impl Stores<S>) -> Self {
        Self::new(stores.card(), stores.version())
    }

    pub fn new(card_store: Arc<S::Card>, version_store: Arc<S::Version>) -> Self {
        Self {
            card_store,
            version_store,
            _marker: PhantomData,
        }
    }

    async fn card(&self, card_id: &CardId) -> CardResult<StoredCard> {
        self.card_store
            .get_card(card_id)
            .await?
            .ok_or_else(|| CardError::not_found("card", card_id))
    }

    /// Load a snapshot, treating one that belongs to another card as missing
    pub async fn get(&self, card_id: &CardId, version_id: &VersionId) -> CardResult<VersionSnapshot> {
        match self.version_store.get_version(version_id).await? {
            Some(version) if &version.card_id == card_id => Ok(version),
            _ => Err(CardError::not_found("version", version_id)),
        }
    }

    /// Snapshot the card's current data
    pub async fn snapshot(&self, card_id: &CardId, message: &str) -> CardResult<VersionSnapshot> {
        let card = self.card(card_id).await?;
        let version = self
            .version_store
            .create_version(card_id, card.data.clone(), message)
            .await?;
        info!(
            card_id = %card_id,
            version = version.version_number,
            hash = %version.content_hash,
            "created card snapshot"
        );
        Ok(version)
    }

    /// Snapshots of a card, oldest first
    pub async fn list(&self, card_id: &CardId) -> CardResult<Vec<VersionInfo>> {
        self.card(card_id).await?;
        let versions = self.version_store.list_versions(card_id).await?;
        Ok(versions.iter().map(VersionInfo::from).collect())
    }

    /// Diff a snapshot (original side) against the live card (current side)
    pub async fn diff_against_live(
        &self,
        card_id: &CardId,
        version_id: &VersionId,
    ) -> CardResult<CardDiff> {
        let card = self.card(card_id).await?;
        let version = self.get(card_id, version_id).await?;
        Ok(diff_cards(&version.data, &card.data))
    }

    /// Diff two snapshots of the same card
    pub async fn diff_versions(
        &self,
        card_id: &CardId,
        from: &VersionId,
        to: &VersionId,
    ) -> CardResult<CardDiff> {
        let from = self.get(card_id, from).await?;
        let to = self.get(card_id, to).await?;
        Ok(diff_cards(&from.data, &to.data))
    }

    pub async fn delete(&self, card_id: &CardId, version_id: &VersionId) -> CardResult<()> {
        self.get(card_id, version_id).await?;
        self.version_store.delete_version(version_id).await?;
        info!(card_id = %card_id, version_id = %version_id, "deleted card snapshot");
        Ok(())
    }
}
