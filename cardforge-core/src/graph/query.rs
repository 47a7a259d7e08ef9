//! Read-only graph accessors

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::node::{AssetGraph, AssetGraphNode};
use crate::storage::ids::BindingId;
use crate::storage::types::binding::{ROLE_BACKGROUND, ROLE_ICON, parse_actor_tag};

/// The main node for a role: the `is_main` node with the lowest order
///
/// With several main nodes (an inconsistent state), the first in graph order
/// wins, so reads stay deterministic until the conflict is fixed.
pub fn main_for_role<'a>(graph: &'a AssetGraph, role: &str) -> Option<&'a AssetGraphNode> {
    graph
        .iter()
        .filter(|n| n.role() == role && n.is_main())
        .min_by_key(|n| n.order())
}

pub fn get_main_portrait(graph: &AssetGraph) -> Option<&AssetGraphNode> {
    main_for_role(graph, ROLE_ICON)
}

pub fn get_main_background(graph: &AssetGraph) -> Option<&AssetGraphNode> {
    main_for_role(graph, ROLE_BACKGROUND)
}

/// Distinct actor indices referenced by well-formed `actor:<N>` tags, ascending
pub fn list_actors(graph: &AssetGraph) -> Vec<u32> {
    graph
        .iter()
        .flat_map(|n| n.binding.tags.iter())
        .filter_map(|t| parse_actor_tag(t))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Nodes whose media animates, in graph order
pub fn list_animated_assets(graph: &AssetGraph) -> Vec<&AssetGraphNode> {
    graph.iter().filter(|n| n.is_animated()).collect()
}

/// Aggregate counts for a graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSummary {
    pub total: usize,
    pub by_type: BTreeMap<String, usize>,
    pub main_portrait: Option<BindingId>,
    pub main_background: Option<BindingId>,
    pub actors: Vec<u32>,
    pub animated: Vec<BindingId>,
    pub broken: usize,
}

pub fn summarize(graph: &AssetGraph) -> GraphSummary {
    let mut by_type = BTreeMap::new();
    for node in graph.iter() {
        *by_type.entry(node.role().to_string()).or_insert(0) += 1;
    }

    GraphSummary {
        total: graph.len(),
        by_type,
        main_portrait: get_main_portrait(graph).map(|n| n.id().clone()),
        main_background: get_main_background(graph).map(|n| n.id().clone()),
        actors: list_actors(graph),
        animated: list_animated_assets(graph)
            .into_iter()
            .map(|n| n.id().clone())
            .collect(),
        broken: graph.iter().filter(|n| n.is_broken()).count(),
    }
}
