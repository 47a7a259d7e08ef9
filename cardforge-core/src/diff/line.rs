use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffKind {
    Add,
    Remove,
    Unchanged,
}

/// One line of a line diff
///
/// `line_number` is 1-based, on the revised side for `add` and on the
/// original side otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffOperation {
    #[serde(rename = "type")]
    pub kind: DiffKind,
    pub value: String,
    pub line_number: usize,
}

impl DiffOperation {
    fn new(kind: DiffKind, value: &str, line_number: usize) -> Self {
        Self {
            kind,
            value: value.to_string(),
            line_number,
        }
    }

    pub fn is_change(&self) -> bool {
        self.kind != DiffKind::Unchanged
    }
}

/// Compare two texts line by line with two synchronized cursors
///
/// Equal lines are unchanged; differing lines become a remove/add pair; the
/// tail of the longer side becomes pure adds or removes. No alignment
/// search is done, so a line inserted mid-text mismatches every line after it.
pub fn compute_line_diff(original: &str, revised: &str) -> Vec<DiffOperation> {
    let original: Vec<&str> = original.split('\n').collect();
    let revised: Vec<&str> = revised.split('\n').collect();

    let mut ops = Vec::with_capacity(original.len().max(revised.len()));
    let (mut i, mut j) = (0, 0);

    while i < original.len() || j < revised.len() {
        match (original.get(i), revised.get(j)) {
            (Some(a), Some(b)) if a == b => {
                ops.push(DiffOperation::new(DiffKind::Unchanged, a, i + 1));
                i += 1;
                j += 1;
            }
            (None, Some(b)) => {
                ops.push(DiffOperation::new(DiffKind::Add, b, j + 1));
                j += 1;
            }
            (Some(a), None) => {
                ops.push(DiffOperation::new(DiffKind::Remove, a, i + 1));
                i += 1;
            }
            (Some(a), Some(b)) => {
                ops.push(DiffOperation::new(DiffKind::Remove, a, i + 1));
                ops.push(DiffOperation::new(DiffKind::Add, b, j + 1));
                i += 1;
                j += 1;
            }
            (None, None) => break,
        }
    }

    ops
}

/// Per-kind line counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffStats {
    pub added: usize,
    pub removed: usize,
    pub unchanged: usize,
}

impl DiffStats {
    pub fn has_changes(&self) -> bool {
        self.added > 0 || self.removed > 0
    }
}

pub fn diff_stats(ops: &[DiffOperation]) -> DiffStats {
    ops.iter().fold(DiffStats::default(), |mut stats, op| {
        match op.kind {
            DiffKind::Add => stats.added += 1,
            DiffKind::Remove => stats.removed += 1,
            DiffKind::Unchanged => stats.unchanged += 1,
        }
        stats
    })
}

/// A rendered diff region: a visible line, or a folded run of unchanged lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DiffHunk {
    Line(DiffOperation),
    #[serde(rename_all = "camelCase")]
    Collapsed { count: usize, start_line: usize },
}

/// Fold unchanged runs, keeping `context` lines next to each change
///
/// A run before the first change keeps only its trailing context, a run
/// after the last change only its leading context. A diff without changes
/// folds entirely.
pub fn collapse_unchanged(ops: &[DiffOperation], context: usize) -> Vec<DiffHunk> {
    let mut hunks = Vec::new();
    let mut pos = 0;

    while pos < ops.len() {
        if ops[pos].is_change() {
            hunks.push(DiffHunk::Line(ops[pos].clone()));
            pos += 1;
            continue;
        }

        let start = pos;
        while pos < ops.len() && !ops[pos].is_change() {
            pos += 1;
        }
        let end = pos;

        let keep_head = if start == 0 { 0 } else { context };
        let keep_tail = if end == ops.len() { 0 } else { context };
        let len = end - start;

        if len <= keep_head + keep_tail {
            hunks.extend(ops[start..end].iter().cloned().map(DiffHunk::Line));
            continue;
        }

        hunks.extend(ops[start..start + keep_head].iter().cloned().map(DiffHunk::Line));
        let hidden = &ops[start + keep_head..end - keep_tail];
        hunks.push(DiffHunk::Collapsed {
            count: hidden.len(),
            start_line: hidden[0].line_number,
        });
        hunks.extend(ops[end - keep_tail..end].iter().cloned().map(DiffHunk::Line));
    }

    hunks
}
