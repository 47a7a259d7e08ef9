//! Storage trait definitions
//!
//! All storage traits are defined here, with implementations in `implementations/`.

mod asset;
mod binding;
mod card;
mod version;

pub use asset::AssetStore;
pub use binding::BindingStore;
pub use card::CardStore;
pub use version::VersionStore;

use std::sync::Arc;

/// Bundles all storage type associations into a single trait.
///
/// ```ignore
/// pub struct AppStorage;
///
/// impl StorageTypes for AppStorage {
///     type Card = SqliteStore;
///     type Asset = SqliteStore;
///     type Binding = SqliteStore;
///     type Version = SqliteStore;
/// }
///
/// type AppGraphService = AssetGraphService<AppStorage>;
/// ```
pub trait StorageTypes: Send + Sync + 'static {
    /// Card documents (existence check + data payload)
    type Card: CardStore + Send + Sync;
    /// Asset metadata
    type Asset: AssetStore + Send + Sync;
    /// Card/asset bindings
    type Binding: BindingStore + Send + Sync;
    /// Version snapshots
    type Version: VersionStore + Send + Sync;
}

/// Provides access to store instances.
///
/// An implementation may hand out the same underlying store (e.g. one
/// `SqliteStore`) from several accessors.
pub trait Stores<S: StorageTypes>: Send + Sync {
    fn card(&self) -> Arc<S::Card>;
    fn asset(&self) -> Arc<S::Asset>;
    fn binding(&self) -> Arc<S::Binding>;
    fn version(&self) -> Arc<S::Version>;
}
