//! Storage types
//!
//! Shared types used by storage traits and implementations.

pub mod asset;
pub mod binding;
pub mod card;
pub mod stored;
pub mod version;

// Re-exports for convenience
pub use asset::{Asset, StoredAsset};
pub use binding::{BindingPatch, CardAssetBinding, NewBinding};
pub use card::{Card, CardSpec, StoredCard};
pub use stored::{Editable, Stored};
pub use version::{VersionInfo, VersionSnapshot};
