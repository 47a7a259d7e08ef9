//! Graph consistency checks
//!
//! Issues are reported, never fixed here. Mutations that would fix them are
//! the caller's choice.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use super::node::{AssetGraph, AssetGraphNode};
use crate::storage::ids::{AssetId, BindingId};
use crate::storage::types::binding::parse_actor_tag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// One consistency problem, tied to the node it was found on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    /// Graph node (binding) id
    pub asset_id: BindingId,
    pub asset_name: String,
    /// Referenced asset row
    pub referenced_asset_id: AssetId,
    pub severity: Severity,
    pub message: String,
}

impl ValidationIssue {
    fn new(node: &AssetGraphNode, severity: Severity, message: String) -> Self {
        Self {
            asset_id: node.id().clone(),
            asset_name: node.binding.name.clone(),
            referenced_asset_id: node.binding.asset_id.clone(),
            severity,
            message,
        }
    }
}

/// Check a graph for broken references, main-flag conflicts, undeclared
/// actors and duplicate orders
pub fn validate_graph(graph: &AssetGraph) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for node in graph.iter().filter(|n| n.is_broken()) {
        issues.push(ValidationIssue::new(
            node,
            Severity::Error,
            format!("referenced asset not found: {}", node.binding.asset_id),
        ));
    }

    // Graph order is (order, id), so the first main per role is the winner
    let mut main_seen: HashMap<&str, &BindingId> = HashMap::new();
    for node in graph.iter().filter(|n| n.is_main()) {
        match main_seen.get(node.role()) {
            Some(winner) => issues.push(ValidationIssue::new(
                node,
                Severity::Warning,
                format!(
                    "duplicate main flag for type '{}' (main is {})",
                    node.role(),
                    winner
                ),
            )),
            None => {
                main_seen.insert(node.role(), node.id());
            }
        }
    }

    for node in graph.iter() {
        for actor in node.binding.tags.iter().filter_map(|t| parse_actor_tag(t)) {
            if actor > graph.actor_count {
                issues.push(ValidationIssue::new(
                    node,
                    Severity::Info,
                    format!(
                        "actor {} is not declared on this card ({} declared)",
                        actor, graph.actor_count
                    ),
                ));
            }
        }
    }

    let mut by_order: BTreeMap<i64, Vec<&AssetGraphNode>> = BTreeMap::new();
    for node in graph.iter() {
        by_order.entry(node.order()).or_default().push(node);
    }
    for (order, nodes) in by_order {
        for node in nodes.iter().skip(1) {
            issues.push(ValidationIssue::new(
                node,
                Severity::Error,
                format!("duplicate order {} (shared with {})", order, nodes[0].id()),
            ));
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{graph, node};
    use super::*;

    #[test]
    fn test_clean_graph() {
        let g = graph(
            1,
            vec![
                node("a", "icon", 0, true, &["actor:1"]),
                node("b", "background", 1, true, &[]),
            ],
        );
        assert!(validate_graph(&g).is_empty());
    }

    #[test]
    fn test_broken_reference() {
        let broken = AssetGraphNode::new(node("x", "icon", 0, false, &[]).binding, None);
        let issues = validate_graph(&graph(0, vec![broken]));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Error);
        assert!(issues[0].message.contains("referenced asset not found"));
        assert_eq!(issues[0].asset_id.as_str(), "x");
    }

    #[test]
    fn test_duplicate_main_flags_one_warning_per_loser() {
        let g = graph(
            0,
            vec![
                node("a", "icon", 0, true, &[]),
                node("b", "icon", 1, true, &[]),
                node("c", "icon", 2, true, &[]),
                node("bg", "background", 3, true, &[]),
            ],
        );
        let issues = validate_graph(&g);
        let flagged: Vec<_> = issues.iter().map(|i| i.asset_id.as_str()).collect();
        assert_eq!(flagged, vec!["b", "c"]);
        assert!(issues.iter().all(|i| i.severity == Severity::Warning));
        assert!(issues[0].message.contains("duplicate main flag"));
    }

    #[test]
    fn test_two_main_portraits_warn_and_lower_order_wins() {
        let g = graph(
            0,
            vec![
                node("hi", "icon", 5, true, &[]),
                node("lo", "icon", 1, true, &[]),
            ],
        );

        let issues = validate_graph(&g);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);
        assert_eq!(issues[0].asset_id.as_str(), "hi");
        assert!(issues[0].message.starts_with("duplicate main flag"));

        let main = crate::graph::query::get_main_portrait(&g).unwrap();
        assert_eq!(main.id().as_str(), "lo");
    }

    #[test]
    fn test_undeclared_actor_is_info() {
        let g = graph(
            1,
            vec![
                node("a", "icon", 0, false, &["actor:1"]),
                node("b", "icon", 1, false, &["actor:3"]),
            ],
        );
        let issues = validate_graph(&g);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Info);
        assert_eq!(issues[0].asset_id.as_str(), "b");
    }

    #[test]
    fn test_duplicate_order() {
        let g = graph(
            0,
            vec![
                node("a", "icon", 1, false, &[]),
                node("b", "sound", 1, false, &[]),
                node("c", "sound", 1, false, &[]),
                node("d", "sound", 2, false, &[]),
            ],
        );
        let issues = validate_graph(&g);
        let flagged: Vec<_> = issues.iter().map(|i| i.asset_id.as_str()).collect();
        assert_eq!(flagged, vec!["b", "c"]);
        assert!(issues.iter().all(|i| i.severity == Severity::Error));
        assert!(issues[0].message.starts_with("duplicate order 1"));
    }

    #[test]
    fn test_severity_wire_form() {
        assert_eq!(serde_json::to_value(Severity::Warning).unwrap(), "warning");
    }
}
