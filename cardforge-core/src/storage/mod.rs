//! Storage abstractions for cards, assets, bindings and version snapshots
//!
//! Traits live in `traits/`, shared data types in `types/`, backends in
//! `implementations/`:
//!
//! - `memory` - in-process storage (always available)
//! - `sqlite` - SQLite-backed storage (requires `sqlite` feature)
//!
//! The asset graph and version history only talk to the traits, bundled
//! through [`StorageTypes`] and [`Stores`].

pub mod helper;
pub mod ids;
pub mod implementations;
pub mod traits;
pub mod types;

pub use ids::{AssetId, BindingId, CardId, VersionId};
pub use implementations::memory::{
    MemoryAssetStore, MemoryBindingStore, MemoryCardStore, MemoryStorage, MemoryStores,
    MemoryVersionStore,
};
#[cfg(feature = "sqlite")]
pub use implementations::sqlite::{SqliteStorage, SqliteStore, SqliteStores};
pub use traits::{AssetStore, BindingStore, CardStore, StorageTypes, Stores, VersionStore};
