//! Core of the cardforge card authoring backend
//!
//! This crate provides:
//! - **Storage**: `CardStore`, `AssetStore`, `BindingStore`, `VersionStore` traits
//!   with memory and SQLite backends
//! - **Asset graph**: `AssetGraph` with pure queries and mutations, and
//!   `AssetGraphService` to load and persist it
//! - **Diff**: line and lorebook diffs between two card payloads
//! - **Versions**: `VersionHistory` snapshots and diffs
//! - **Media**: animated image detection
//!
//! # Example
//!
//! ```ignore
//! use cardforge_core::{AssetGraphService, MemoryStores, set_portrait_override};
//!
//! let service = AssetGraphService::from_stores(&stores);
//! let graph = service.build_graph(&card_id).await?;
//! let next = set_portrait_override(&graph, &binding_id);
//! service.apply_changes(&graph, &next).await?;
//! ```
pub mod diff;
pub mod error;
pub mod graph;
pub mod media;
pub mod storage;
pub mod versions;

pub use diff::{CardDiff, LorebookDiff, compute_line_diff, compute_lorebook_diff, diff_cards};
pub use error::{CardError, CardResult};
pub use graph::{
    ApplyReport, AssetGraph, AssetGraphNode, AssetGraphService, AttachAsset, GraphReport,
    GraphSummary, Severity, ValidationIssue, bind_to_actor, get_main_background,
    get_main_portrait, list_actors, list_animated_assets, reorder_assets, set_main,
    set_main_background, set_portrait_override, unbind_from_actor, validate_graph,
};
pub use storage::{
    AssetId, BindingId, CardId, MemoryStorage, MemoryStores, StorageTypes, Stores, VersionId,
};
#[cfg(feature = "sqlite")]
pub use storage::{SqliteStorage, SqliteStore, SqliteStores};
pub use versions::VersionHistory;
