//! Diff engine behaviour on realistic card payloads

use cardforge_core::diff::{DiffKind, EntryStatus, collapse_unchanged, DiffHunk};
use cardforge_core::{compute_line_diff, compute_lorebook_diff, diff_cards};
use serde_json::json;

#[test]
fn test_cursor_diff_substitution() {
    let ops = compute_line_diff("a\nb\nc", "a\nx\nc");
    let shape: Vec<_> = ops.iter().map(|op| (op.kind, op.value.as_str())).collect();
    assert_eq!(
        shape,
        vec![
            (DiffKind::Unchanged, "a"),
            (DiffKind::Remove, "b"),
            (DiffKind::Add, "x"),
            (DiffKind::Unchanged, "c"),
        ]
    );
}

#[test]
fn test_round_trip_line_count() {
    let text = "line one\nline two\n\nline four";
    let ops = compute_line_diff(text, text);
    assert_eq!(ops.len(), text.split('\n').count());
    assert!(ops.iter().all(|op| op.kind == DiffKind::Unchanged));
}

#[test]
fn test_lorebook_reorder_and_edit() {
    let original = json!({
        "name": "Realm",
        "entries": [
            {"name": "Forest", "keys": ["forest"], "content": "A dark forest."},
            {"name": "River", "keys": ["river"], "content": "Cold water."},
            {"keys": ["mist"], "content": "Unnamed"}
        ]
    });
    let current = json!({
        "name": "Realm",
        "entries": [
            {"name": "River", "keys": ["river"], "content": "Cold water."},
            {"name": "Forest", "keys": ["forest", "woods"], "content": "A dark forest."},
            {"keys": ["mist"], "content": "Unnamed"}
        ]
    });

    let diff = compute_lorebook_diff(Some(&original), Some(&current));
    assert_eq!(diff.entry_summary.modified, 1);
    assert_eq!(diff.entry_summary.unchanged, 2);

    let river = &diff.entry_diffs[0];
    assert_eq!(river.status, EntryStatus::Unchanged);
    assert!(river.moved);

    let forest = &diff.entry_diffs[1];
    assert_eq!(forest.status, EntryStatus::Modified);
    assert_eq!(forest.field_changes.len(), 1);
    assert_eq!(forest.field_changes[0].field, "keys");

    let mist = &diff.entry_diffs[2];
    assert_eq!(mist.status, EntryStatus::Unchanged);
    assert!(!mist.moved);
}

#[test]
fn test_card_diff_collapses_for_display() {
    let mut entries = Vec::new();
    for i in 0..20 {
        entries.push(json!({"name": format!("E{i}"), "content": "same"}));
    }
    let before = json!({"data": {"description": "old", "character_book": {"entries": entries}}});
    let mut after = before.clone();
    after["data"]["description"] = json!("new");

    let diff = diff_cards(&before, &after);
    assert_eq!(diff.stats.added, 1);
    assert_eq!(diff.lorebook.entry_summary.unchanged, 20);

    let hunks = collapse_unchanged(&diff.lines, 2);
    let visible = hunks.iter().filter(|h| matches!(h, DiffHunk::Line(_))).count();
    assert!(visible < diff.lines.len());
    assert!(hunks.iter().any(|h| matches!(h, DiffHunk::Collapsed { .. })));
}
