//! Entry-aware lorebook diff
//!
//! Entries are matched across the two sides by identity rather than by
//! position: the entry `name` when it is non-empty, otherwise the entry's
//! position plus a fingerprint of its sorted keys.

use std::collections::{HashMap, VecDeque};

use serde::Serialize;
use serde_json::Value;

/// Entry fields compared by value
pub const ENTRY_FIELDS: [&str; 12] = [
    "keys",
    "content",
    "enabled",
    "insertion_order",
    "priority",
    "secondary_keys",
    "selective",
    "selective_logic",
    "position",
    "probability",
    "case_sensitive",
    "constant",
];

/// Lorebook-level settings
pub const SETTINGS_FIELDS: [&str; 5] = [
    "name",
    "description",
    "scan_depth",
    "token_budget",
    "recursive_scanning",
];

/// Find the lorebook inside a card document
///
/// Checks `data.character_book` (v2/v3 cards), `data` of a `lorebook_v3`
/// wrapper, a top-level `character_book`, then the document itself when it
/// carries `entries`.
pub fn locate_lorebook(doc: &Value) -> Option<&Value> {
    if let Some(book) = doc.pointer("/data/character_book").filter(|v| v.is_object()) {
        return Some(book);
    }
    if doc.get("spec").and_then(Value::as_str) == Some("lorebook_v3") {
        if let Some(data) = doc.get("data").filter(|v| v.is_object()) {
            return Some(data);
        }
    }
    if let Some(book) = doc.get("character_book").filter(|v| v.is_object()) {
        return Some(book);
    }
    doc.get("entries").map(|_| doc)
}

fn entries(lorebook: Option<&Value>) -> &[Value] {
    lorebook
        .and_then(|book| book.get("entries"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn entry_name(entry: &Value) -> Option<&str> {
    entry
        .get("name")
        .and_then(Value::as_str)
        .filter(|name| !name.trim().is_empty())
}

/// Stable identity used to match an entry across two lorebooks
pub fn entry_identity(entry: &Value, index: usize) -> String {
    if let Some(name) = entry_name(entry) {
        return format!("name:{}", name.trim());
    }

    let mut keys: Vec<String> = entry
        .get("keys")
        .and_then(Value::as_array)
        .map(|keys| {
            keys.iter()
                .map(|k| match k {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect()
        })
        .unwrap_or_default();
    keys.sort();
    format!("#{}:{}", index, keys.join(","))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Added,
    Removed,
    Modified,
    Unchanged,
}

/// A single differing entry field; a missing side is omitted
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldChange {
    pub field: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryDiffResult {
    pub identity: String,
    pub name: Option<String>,
    pub status: EntryStatus,
    pub original_index: Option<usize>,
    pub current_index: Option<usize>,
    pub field_changes: Vec<FieldChange>,
    pub moved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moved_from: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moved_to: Option<usize>,
    pub original: Option<Value>,
    pub current: Option<Value>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EntrySummary {
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
    pub unchanged: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LorebookDiff {
    pub entry_summary: EntrySummary,
    pub entry_diffs: Vec<EntryDiffResult>,
    pub settings_changed: bool,
    pub changed_settings: Vec<String>,
}

impl LorebookDiff {
    pub fn has_changes(&self) -> bool {
        self.settings_changed
            || self.entry_summary.added > 0
            || self.entry_summary.removed > 0
            || self.entry_summary.modified > 0
            || self.entry_diffs.iter().any(|e| e.moved)
    }
}

fn field_changes(original: &Value, current: &Value) -> Vec<FieldChange> {
    ENTRY_FIELDS
        .iter()
        .filter_map(|&field| {
            let (a, b) = (original.get(field), current.get(field));
            (a != b).then(|| FieldChange {
                field: field.to_string(),
                original: a.cloned(),
                current: b.cloned(),
            })
        })
        .collect()
}

/// Diff two lorebook objects; either side may be absent or malformed
pub fn compute_lorebook_diff(original: Option<&Value>, current: Option<&Value>) -> LorebookDiff {
    let original_entries = entries(original);
    let current_entries = entries(current);

    let mut unmatched: HashMap<String, VecDeque<usize>> = HashMap::new();
    for (index, entry) in original_entries.iter().enumerate() {
        unmatched
            .entry(entry_identity(entry, index))
            .or_default()
            .push_back(index);
    }

    let mut summary = EntrySummary::default();
    let mut diffs = Vec::with_capacity(current_entries.len());
    let mut matched = vec![false; original_entries.len()];

    for (current_index, entry) in current_entries.iter().enumerate() {
        let identity = entry_identity(entry, current_index);
        let name = entry_name(entry).map(str::to_string);
        let original_index = unmatched
            .get_mut(&identity)
            .and_then(VecDeque::pop_front);

        let Some(original_index) = original_index else {
            summary.added += 1;
            diffs.push(EntryDiffResult {
                identity,
                name,
                status: EntryStatus::Added,
                original_index: None,
                current_index: Some(current_index),
                field_changes: Vec::new(),
                moved: false,
                moved_from: None,
                moved_to: None,
                original: None,
                current: Some(entry.clone()),
            });
            continue;
        };

        matched[original_index] = true;
        let before = &original_entries[original_index];
        let changes = field_changes(before, entry);
        let status = if changes.is_empty() {
            summary.unchanged += 1;
            EntryStatus::Unchanged
        } else {
            summary.modified += 1;
            EntryStatus::Modified
        };
        let moved = original_index != current_index;

        diffs.push(EntryDiffResult {
            identity,
            name,
            status,
            original_index: Some(original_index),
            current_index: Some(current_index),
            field_changes: changes,
            moved,
            moved_from: moved.then_some(original_index),
            moved_to: moved.then_some(current_index),
            original: Some(before.clone()),
            current: Some(entry.clone()),
        });
    }

    for (index, entry) in original_entries.iter().enumerate() {
        if matched[index] {
            continue;
        }
        summary.removed += 1;
        diffs.push(EntryDiffResult {
            identity: entry_identity(entry, index),
            name: entry_name(entry).map(str::to_string),
            status: EntryStatus::Removed,
            original_index: Some(index),
            current_index: None,
            field_changes: Vec::new(),
            moved: false,
            moved_from: None,
            moved_to: None,
            original: Some(entry.clone()),
            current: None,
        });
    }

    let setting = |book: Option<&Value>, field: &str| book.and_then(|b| b.get(field)).cloned();
    let changed_settings: Vec<String> = SETTINGS_FIELDS
        .iter()
        .filter(|&&field| setting(original, field) != setting(current, field))
        .map(|field| field.to_string())
        .collect();

    LorebookDiff {
        entry_summary: summary,
        entry_diffs: diffs,
        settings_changed: !changed_settings.is_empty(),
        changed_settings,
    }
}
