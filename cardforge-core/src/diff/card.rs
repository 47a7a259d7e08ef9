use serde::Serialize;
use serde_json::Value;

use super::line::{DiffKind, DiffOperation, DiffStats, compute_line_diff, diff_stats};
use super::lorebook::{LorebookDiff, compute_lorebook_diff, locate_lorebook};
use crate::storage::helper::json_hash;

/// Line diff of two card payloads plus the diff of their lorebooks
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDiff {
    pub identical: bool,
    pub lines: Vec<DiffOperation>,
    pub stats: DiffStats,
    pub lorebook: LorebookDiff,
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Diff two card documents as pretty-printed JSON
pub fn diff_cards(original: &Value, current: &Value) -> CardDiff {
    let identical = json_hash(original) == json_hash(current);

    let lines = if identical {
        pretty(current)
            .split('\n')
            .enumerate()
            .map(|(i, line)| DiffOperation {
                kind: DiffKind::Unchanged,
                value: line.to_string(),
                line_number: i + 1,
            })
            .collect()
    } else {
        compute_line_diff(&pretty(original), &pretty(current))
    };

    CardDiff {
        identical,
        stats: diff_stats(&lines),
        lines,
        lorebook: compute_lorebook_diff(locate_lorebook(original), locate_lorebook(current)),
    }
}
