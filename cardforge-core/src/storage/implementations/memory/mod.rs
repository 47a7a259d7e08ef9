//! In-memory storage implementations
//!
//! These implementations keep everything in process memory. They back the
//! server's `memory` storage mode and are used throughout the tests.

mod asset;
mod binding;
mod card;
mod version;

pub use asset::MemoryAssetStore;
pub use binding::MemoryBindingStore;
pub use card::MemoryCardStore;
pub use version::MemoryVersionStore;

use anyhow::{Result, anyhow};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::storage::traits::{StorageTypes, Stores};

/// Lock a store mutex, turning poisoning into a storage error
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| anyhow!("in-memory store lock poisoned"))
}

/// Storage configuration backed entirely by memory
pub struct MemoryStorage;

impl StorageTypes for MemoryStorage {
    type Card = MemoryCardStore;
    type Asset = MemoryAssetStore;
    type Binding = MemoryBindingStore;
    type Version = MemoryVersionStore;
}

/// Shared handles to one set of in-memory stores
#[derive(Clone, Default)]
pub struct MemoryStores {
    card: Arc<MemoryCardStore>,
    asset: Arc<MemoryAssetStore>,
    binding: Arc<MemoryBindingStore>,
    version: Arc<MemoryVersionStore>,
}

impl MemoryStores {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Stores<MemoryStorage> for MemoryStores {
    fn card(&self) -> Arc<MemoryCardStore> {
        self.card.clone()
    }

    fn asset(&self) -> Arc<MemoryAssetStore> {
        self.asset.clone()
    }

    fn binding(&self) -> Arc<MemoryBindingStore> {
        self.binding.clone()
    }

    fn version(&self) -> Arc<MemoryVersionStore> {
        self.version.clone()
    }
}
