//! Diff engine for card snapshots
//!
//! - `line` - cursor-synchronous line diff over serialized documents
//! - `lorebook` - entry-aware lorebook diff
//! - `card` - both diffs over two card payloads
//!
//! Nothing here performs I/O or fails; malformed input degrades to a diff.

mod card;
mod line;
mod lorebook;

pub use card::{CardDiff, diff_cards};
pub use line::{DiffHunk, DiffKind, DiffOperation, DiffStats, collapse_unchanged, compute_line_diff, diff_stats};
pub use lorebook::{
    ENTRY_FIELDS, EntryDiffResult, EntryStatus, EntrySummary, FieldChange, LorebookDiff,
    SETTINGS_FIELDS, compute_lorebook_diff, entry_identity, locate_lorebook,
};
