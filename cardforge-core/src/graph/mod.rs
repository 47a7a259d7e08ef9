//! Asset graph: the per-card view of bindings joined with asset metadata
//!
//! - `node` - [`AssetGraph`] and [`AssetGraphNode`]
//! - `query` - read-only accessors (main portrait, actors, animated assets)
//! - `mutate` - pure transformations returning a new graph
//! - `validate` - consistency report
//! - `service` - [`AssetGraphService`], the bridge to the stores
//!
//! Mutations never touch storage. Callers load a graph, transform it and hand
//! both versions to [`AssetGraphService::apply_changes`].

mod mutate;
mod node;
mod query;
mod service;
mod validate;

pub use mutate::{
    bind_to_actor, reorder_assets, set_main, set_main_background, set_portrait_override,
    unbind_from_actor,
};
pub use node::{AssetGraph, AssetGraphNode, JoinedAsset};
pub use query::{
    GraphSummary, get_main_portrait, get_main_background, list_actors, list_animated_assets,
    main_for_role, summarize,
};
pub use service::{ApplyReport, AssetGraphService, AttachAsset, GraphChanges, GraphReport};
pub use validate::{Severity, ValidationIssue, validate_graph};

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::BTreeSet;

    use super::*;
    use crate::storage::{AssetId, BindingId, CardId};
    use crate::storage::types::CardAssetBinding;

    /// Build a node with a resolved image asset
    pub fn node(id: &str, role: &str, order: i64, is_main: bool, tags: &[&str]) -> AssetGraphNode {
        let binding = CardAssetBinding {
            id: BindingId::from(id),
            card_id: CardId::from("card"),
            asset_id: AssetId::from(format!("asset-{id}")),
            role: role.to_string(),
            name: id.to_string(),
            ext: "png".to_string(),
            order,
            is_main,
            tags: tags.iter().map(|t| t.to_string()).collect::<BTreeSet<_>>(),
        };
        let asset = JoinedAsset {
            mimetype: "image/png".to_string(),
            size: 16,
            width: None,
            height: None,
            url: format!("/assets/{id}.png"),
        };
        AssetGraphNode::new(binding, Some(asset))
    }

    pub fn graph(actor_count: u32, nodes: Vec<AssetGraphNode>) -> AssetGraph {
        AssetGraph::new(CardId::from("card"), actor_count, nodes)
    }

    pub fn ids(graph: &AssetGraph) -> Vec<&str> {
        graph.nodes.iter().map(|n| n.id().as_str()).collect()
    }
}
