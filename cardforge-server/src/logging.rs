//! tracing setup for the server binary
//!
//! Logs go to stderr and, when a path is available, to
//! `<data dir>/logs/cardforge.log` through a non-blocking writer.

use std::fs::{File, OpenOptions};
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub const DEFAULT_FILTER: &str = "info,cardforge_core=info,cardforge_server=debug";

/// Filter from an explicit directive, else `RUST_LOG`, else the default
pub fn build_filter(directive: Option<&str>) -> EnvFilter {
    match directive {
        Some(directive) => EnvFilter::try_new(directive).unwrap_or_else(|e| {
            eprintln!("[cardforge] invalid log filter {directive:?}: {e}");
            EnvFilter::new(DEFAULT_FILTER)
        }),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
    }
}

fn open_log_file(path: &Path) -> Option<File> {
    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            eprintln!("[cardforge] failed to create log directory {:?}: {}", parent, e);
            return None;
        }
    }

    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!("[cardforge] failed to open log file {:?}: {}", path, e);
            None
        }
    }
}

/// Install the global subscriber
///
/// The returned guard flushes the file writer on drop; keep it alive for
/// the lifetime of the process.
pub fn init_logging(directive: Option<&str>, log_file: Option<&Path>) -> Option<WorkerGuard> {
    let (file_layer, guard) = match log_file.and_then(open_log_file) {
        Some(file) => {
            let (writer, guard) = tracing_appender::non_blocking(file);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let subscriber = tracing_subscriber::registry()
        .with(build_filter(directive))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .with(file_layer);

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("[cardforge] failed to set tracing subscriber: {}", e);
    } else if let Some(path) = log_file {
        tracing::info!("logging initialized, writing to {:?}", path);
    }

    guard
}
