use anyhow::Context;
use cardforge_core::diff::{DiffHunk, DiffKind, collapse_unchanged, compute_line_diff, diff_cards};
use cardforge_core::media::{gif_frame_count, is_animated, sniff_mimetype};
use clap::Parser;
use clap_derive::Subcommand;
use config::load_env_file;
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{Level, debug};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(long, short)]
    tracing: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Line diff of two text files, unchanged regions folded
    Diff {
        original: PathBuf,
        revised: PathBuf,

        /// Unchanged lines kept around each change
        #[arg(long, short, default_value_t = 3, env = "CARDFORGE_DIFF_CONTEXT")]
        context: usize,

        /// Print hunks as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diff two card JSON files: line stats plus lorebook entries
    CardDiff {
        original: PathBuf,
        current: PathBuf,

        /// Include every diff line in the output
        #[arg(long)]
        full: bool,
    },

    /// Report whether a media file is animated
    Sniff {
        file: PathBuf,

        /// Declared mimetype; detected from the header when omitted
        #[arg(long)]
        mime: Option<String>,
    },
}

fn setup_tracing(enable: bool) {
    let level = if enable { Level::TRACE } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Setting default subscriber failed: {e}");
    }
}

fn read_text(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn read_json(path: &Path) -> anyhow::Result<Value> {
    let text = read_text(path)?;
    serde_json::from_str(&text).with_context(|| format!("parsing {} as JSON", path.display()))
}

fn render_hunks(hunks: &[DiffHunk]) -> String {
    let mut out = String::new();
    for hunk in hunks {
        match hunk {
            DiffHunk::Line(op) => {
                let marker = match op.kind {
                    DiffKind::Add => '+',
                    DiffKind::Remove => '-',
                    DiffKind::Unchanged => ' ',
                };
                out.push(marker);
                out.push(' ');
                out.push_str(&op.value);
                out.push('\n');
            }
            DiffHunk::Collapsed { count, start_line } => {
                out.push_str(&format!("@@ {count} unchanged lines from line {start_line} @@\n"));
            }
        }
    }
    out
}

fn text_diff(original: &str, revised: &str, context: usize, as_json: bool) -> anyhow::Result<String> {
    let ops = compute_line_diff(original, revised);
    let hunks = collapse_unchanged(&ops, context);
    debug!(lines = ops.len(), hunks = hunks.len(), "computed line diff");
    if as_json {
        Ok(serde_json::to_string_pretty(&hunks)?)
    } else {
        Ok(render_hunks(&hunks))
    }
}

fn card_diff_report(original: &Value, current: &Value, full: bool) -> Value {
    let diff = diff_cards(original, current);
    let entries: Vec<Value> = diff
        .lorebook
        .entry_diffs
        .iter()
        .map(|e| {
            json!({
                "identity": e.identity,
                "status": e.status,
                "moved": e.moved,
                "fields": e.field_changes.iter().map(|c| c.field.as_str()).collect::<Vec<_>>(),
            })
        })
        .collect();

    let mut report = json!({
        "identical": diff.identical,
        "stats": diff.stats,
        "lorebook": {
            "entrySummary": diff.lorebook.entry_summary,
            "settingsChanged": diff.lorebook.settings_changed,
            "changedSettings": diff.lorebook.changed_settings,
            "entries": entries,
        },
    });
    if full {
        report["lines"] = json!(diff.lines);
    }
    report
}

fn sniff_report(bytes: &[u8], declared: Option<&str>) -> Value {
    let mimetype = declared
        .map(str::to_string)
        .or_else(|| sniff_mimetype(bytes).map(str::to_string));
    let animated = mimetype.as_deref().is_some_and(|m| is_animated(m, bytes));

    let mut report = json!({
        "mimetype": mimetype,
        "animated": animated,
    });
    if mimetype.as_deref() == Some("image/gif") {
        report["frames"] = json!(gif_frame_count(bytes));
    }
    report
}

fn run(command: Command) -> anyhow::Result<String> {
    match command {
        Command::Diff {
            original,
            revised,
            context,
            json,
        } => text_diff(&read_text(&original)?, &read_text(&revised)?, context, json),
        Command::CardDiff {
            original,
            current,
            full,
        } => {
            let report = card_diff_report(&read_json(&original)?, &read_json(&current)?, full);
            Ok(serde_json::to_string_pretty(&report)?)
        }
        Command::Sniff { file, mime } => {
            let bytes = fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
            Ok(serde_json::to_string_pretty(&sniff_report(&bytes, mime.as_deref()))?)
        }
    }
}

fn main() -> anyhow::Result<()> {
    load_env_file();
    let args = Args::parse();
    setup_tracing(args.tracing);

    let output = run(args.command)?;
    print!("{output}");
    if !output.ends_with('\n') {
        println!();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_diff_renders_markers() {
        let out = text_diff("a\nb\nc", "a\nx\nc", 3, false).unwrap();
        assert_eq!(out, "  a\n- b\n+ x\n  c\n");
    }

    #[test]
    fn test_text_diff_folds_long_runs() {
        let original: Vec<String> = (1..=20).map(|n| n.to_string()).collect();
        let mut revised = original.clone();
        revised[0] = "one".to_string();
        let out = text_diff(&original.join("\n"), &revised.join("\n"), 2, false).unwrap();
        assert!(out.starts_with("- 1\n+ one\n  2\n  3\n"));
        assert!(out.ends_with("@@ 17 unchanged lines from line 4 @@\n"));
    }

    #[test]
    fn test_text_diff_json() {
        let out = text_diff("a", "b", 1, true).unwrap();
        let hunks: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(hunks[0]["kind"], "line");
        assert_eq!(hunks[0]["type"], "remove");
    }

    #[test]
    fn test_card_diff_report() {
        let original = json!({"data": {"character_book": {"entries": [{"name": "A", "keys": ["a"]}]}}});
        let current = json!({"data": {"character_book": {"entries": [{"name": "A", "keys": ["a", "b"]}]}}});
        let report = card_diff_report(&original, &current, false);
        assert_eq!(report["identical"], false);
        assert_eq!(report["lorebook"]["entrySummary"]["modified"], 1);
        assert_eq!(report["lorebook"]["entries"][0]["fields"], json!(["keys"]));
        assert!(report.get("lines").is_none());
        assert!(card_diff_report(&original, &current, true)["lines"].is_array());
    }

    #[test]
    fn test_sniff_report() {
        let png_header = b"\x89PNG\r\n\x1a\n\0\0\0\0IEND\0\0\0\0";
        let report = sniff_report(png_header, None);
        assert_eq!(report["mimetype"], "image/png");
        assert_eq!(report["animated"], false);

        let report = sniff_report(b"plain text", None);
        assert!(report["mimetype"].is_null());
        assert_eq!(report["animated"], false);

        let report = sniff_report(b"GIF89a", Some("image/gif"));
        assert_eq!(report["frames"], 0);
    }
}
