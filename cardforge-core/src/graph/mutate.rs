//! Pure graph transformations
//!
//! Every function takes the current graph by reference and returns a new
//! one. Unknown binding ids are a no-op: the result equals the input.

use std::collections::HashSet;

use super::node::{AssetGraph, AssetGraphNode};
use crate::error::{CardError, CardResult};
use crate::storage::ids::BindingId;
use crate::storage::types::binding::{ACTOR_TAG_PREFIX, ROLE_BACKGROUND, ROLE_ICON, actor_tag};

/// Place `ordered_ids` first, in the given sequence, followed by every other
/// node in its current relative order, then renumber `order` as 0..n-1
///
/// Ids that are unknown or repeated in `ordered_ids` are skipped.
pub fn reorder_assets(graph: &AssetGraph, ordered_ids: &[BindingId]) -> AssetGraph {
    let mut placed: HashSet<&BindingId> = HashSet::new();
    let mut sequence: Vec<&AssetGraphNode> = Vec::with_capacity(graph.len());

    for id in ordered_ids {
        if let Some(node) = graph.node(id) {
            if placed.insert(node.id()) {
                sequence.push(node);
            }
        }
    }
    sequence.extend(graph.iter().filter(|n| !placed.contains(n.id())));

    let nodes = sequence
        .into_iter()
        .enumerate()
        .map(|(position, node)| {
            let mut node = node.clone();
            node.binding.order = position as i64;
            node
        })
        .collect();
    graph.with_nodes(nodes)
}

/// Make `id` the only main node among nodes sharing its role
pub fn set_main(graph: &AssetGraph, id: &BindingId) -> AssetGraph {
    let Some(target) = graph.node(id) else {
        return graph.clone();
    };
    let role = target.role().to_string();

    let nodes = graph
        .iter()
        .map(|node| {
            let mut node = node.clone();
            if node.role() == role {
                node.binding.is_main = node.id() == id;
            }
            node
        })
        .collect();
    graph.with_nodes(nodes)
}

/// Make an `icon` node the main portrait; other roles are left alone
pub fn set_portrait_override(graph: &AssetGraph, id: &BindingId) -> AssetGraph {
    set_main_with_role(graph, id, ROLE_ICON)
}

/// Make a `background` node the main background; other roles are left alone
pub fn set_main_background(graph: &AssetGraph, id: &BindingId) -> AssetGraph {
    set_main_with_role(graph, id, ROLE_BACKGROUND)
}

fn set_main_with_role(graph: &AssetGraph, id: &BindingId, role: &str) -> AssetGraph {
    match graph.node(id) {
        Some(node) if node.role() == role => set_main(graph, id),
        _ => graph.clone(),
    }
}

/// Replace any `actor:*` tags on `id` with `actor:<actor_index>`
///
/// The index is checked before the node lookup.
pub fn bind_to_actor(
    graph: &AssetGraph,
    id: &BindingId,
    actor_index: i64,
) -> CardResult<AssetGraph> {
    if actor_index < 1 {
        return Err(CardError::validation(
            "actorIndex",
            format!("must be at least 1, got {actor_index}"),
        ));
    }
    let index = u32::try_from(actor_index)
        .map_err(|_| CardError::validation("actorIndex", format!("out of range: {actor_index}")))?;

    Ok(retag(graph, id, Some(actor_tag(index))))
}

/// Remove every `actor:*` tag from `id`
pub fn unbind_from_actor(graph: &AssetGraph, id: &BindingId) -> AssetGraph {
    retag(graph, id, None)
}

fn retag(graph: &AssetGraph, id: &BindingId, tag: Option<String>) -> AssetGraph {
    if graph.node(id).is_none() {
        return graph.clone();
    }

    let nodes = graph
        .iter()
        .map(|node| {
            let mut node = node.clone();
            if node.id() == id {
                let tags = &mut node.binding.tags;
                tags.retain(|t| !t.starts_with(ACTOR_TAG_PREFIX));
                if let Some(tag) = &tag {
                    tags.insert(tag.clone());
                }
            }
            node
        })
        .collect();
    graph.with_nodes(nodes)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{graph, ids, node};
    use super::*;

    fn bid(s: &str) -> BindingId {
        BindingId::from(s)
    }

    fn orders(g: &AssetGraph) -> Vec<i64> {
        g.iter().map(|n| n.order()).collect()
    }

    #[test]
    fn test_reorder_partial_list() {
        let g = graph(
            0,
            vec![
                node("a", "icon", 0, false, &[]),
                node("b", "icon", 1, false, &[]),
                node("c", "icon", 2, false, &[]),
                node("d", "icon", 3, false, &[]),
            ],
        );
        let out = reorder_assets(&g, &[bid("c"), bid("a")]);
        assert_eq!(ids(&out), vec!["c", "a", "b", "d"]);
        assert_eq!(orders(&out), vec![0, 1, 2, 3]);
        // input untouched
        assert_eq!(ids(&g), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_reorder_skips_unknown_and_repeated_ids() {
        let g = graph(
            0,
            vec![
                node("a", "icon", 10, false, &[]),
                node("b", "icon", 20, false, &[]),
            ],
        );
        let out = reorder_assets(&g, &[bid("zzz"), bid("b"), bid("b")]);
        assert_eq!(ids(&out), vec!["b", "a"]);
        assert_eq!(orders(&out), vec![0, 1]);
    }

    #[test]
    fn test_reorder_empty_list_renumbers() {
        let g = graph(
            0,
            vec![
                node("a", "icon", 4, false, &[]),
                node("b", "icon", 4, false, &[]),
            ],
        );
        let out = reorder_assets(&g, &[]);
        assert_eq!(ids(&out), vec!["a", "b"]);
        assert_eq!(orders(&out), vec![0, 1]);
    }

    #[test]
    fn test_set_main_is_exclusive_per_role() {
        let g = graph(
            0,
            vec![
                node("p1", "icon", 0, true, &[]),
                node("p2", "icon", 1, true, &[]),
                node("p3", "icon", 2, false, &[]),
                node("bg", "background", 3, true, &[]),
            ],
        );
        let out = set_main(&g, &bid("p3"));
        let mains: Vec<_> = out
            .iter()
            .filter(|n| n.is_main())
            .map(|n| n.id().as_str())
            .collect();
        assert_eq!(mains, vec!["p3", "bg"]);
    }

    #[test]
    fn test_set_main_unknown_id_is_noop() {
        let g = graph(0, vec![node("p1", "icon", 0, true, &[])]);
        assert_eq!(set_main(&g, &bid("nope")), g);
    }

    #[test]
    fn test_role_specific_main_setters() {
        let g = graph(
            0,
            vec![
                node("p1", "icon", 0, true, &[]),
                node("p2", "icon", 1, false, &[]),
                node("bg1", "background", 2, true, &[]),
                node("bg2", "background", 3, false, &[]),
            ],
        );

        let out = set_portrait_override(&g, &bid("p2"));
        assert!(out.node(&bid("p2")).unwrap().is_main());
        assert!(!out.node(&bid("p1")).unwrap().is_main());

        let out = set_main_background(&g, &bid("bg2"));
        assert!(out.node(&bid("bg2")).unwrap().is_main());
        assert!(!out.node(&bid("bg1")).unwrap().is_main());

        // wrong role is a no-op
        assert_eq!(set_portrait_override(&g, &bid("bg2")), g);
        assert_eq!(set_main_background(&g, &bid("p2")), g);
    }

    #[test]
    fn test_bind_to_actor_replaces_existing_actor_tag() {
        let g = graph(
            2,
            vec![node("a", "icon", 0, false, &["actor:1", "actor:junk", "emotion:happy"])],
        );
        let out = bind_to_actor(&g, &bid("a"), 2).unwrap();
        let tags: Vec<_> = out.nodes[0].binding.tags.iter().cloned().collect();
        assert_eq!(tags, vec!["actor:2", "emotion:happy"]);
        assert_eq!(out.nodes[0].actor(), Some(2));
    }

    #[test]
    fn test_bind_to_actor_is_idempotent() {
        let g = graph(1, vec![node("a", "icon", 0, false, &["state:idle"])]);
        let once = bind_to_actor(&g, &bid("a"), 1).unwrap();
        let twice = bind_to_actor(&once, &bid("a"), 1).unwrap();
        assert_eq!(twice, once);
        assert_eq!(once.node(&bid("a")).unwrap().actor(), Some(1));
    }

    #[test]
    fn test_bind_to_actor_rejects_non_positive_index() {
        let g = graph(0, vec![node("a", "icon", 0, false, &[])]);
        for index in [0, -3] {
            let err = bind_to_actor(&g, &bid("a"), index).unwrap_err();
            assert!(matches!(err, CardError::Validation { field: "actorIndex", .. }));
        }
        // checked even for unknown ids
        assert!(bind_to_actor(&g, &bid("missing"), 0).is_err());
        assert_eq!(bind_to_actor(&g, &bid("missing"), 1).unwrap(), g);
    }

    #[test]
    fn test_unbind_from_actor() {
        let g = graph(
            1,
            vec![
                node("a", "icon", 0, false, &["actor:1", "state:idle"]),
                node("b", "icon", 1, false, &["actor:1"]),
            ],
        );
        let out = unbind_from_actor(&g, &bid("a"));
        assert!(out.node(&bid("a")).unwrap().actor().is_none());
        assert!(out.node(&bid("a")).unwrap().has_tag("state:idle"));
        assert_eq!(out.node(&bid("b")).unwrap().actor(), Some(1));
    }
}
