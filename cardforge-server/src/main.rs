//! cardforge server - standalone binary
//!
//! Settings come from settings.toml, then `CARDFORGE_*` environment
//! variables (also read from .env files), then flags.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use cardforge_core::{MemoryStores, SqliteStore, SqliteStores};
use cardforge_server::{Api, ServerHandle, logging, start_server_on};
use clap::Parser;
use config::{PathManager, Settings, StorageKind};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Host to bind to
    #[arg(short = 'H', long, env = "CARDFORGE_HOST")]
    host: Option<String>,

    /// Port to listen on (0 for random)
    #[arg(short, long, env = "CARDFORGE_PORT")]
    port: Option<u16>,

    /// Storage backend: memory or sqlite
    #[arg(long, env = "CARDFORGE_STORAGE")]
    storage: Option<StorageKind>,

    /// SQLite database file
    #[arg(long, env = "CARDFORGE_DB")]
    db: Option<PathBuf>,

    /// Data directory for the database, settings and logs
    #[arg(long, env = "CARDFORGE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// tracing filter, e.g. "debug" or "info,cardforge_core=trace"
    #[arg(short, long, env = "CARDFORGE_LOG")]
    log_level: Option<String>,

    /// Log to stderr only
    #[arg(long)]
    no_log_file: bool,
}

impl Args {
    fn apply(&self, settings: &mut Settings) {
        if let Some(host) = &self.host {
            settings.host = host.clone();
        }
        if let Some(port) = self.port {
            settings.port = port;
        }
        if let Some(storage) = self.storage {
            settings.storage = storage;
        }
        if let Some(db) = &self.db {
            settings.db_path = Some(db.clone());
        }
        if let Some(level) = &self.log_level {
            settings.log_filter = Some(level.clone());
        }
    }
}

async fn start(settings: &Settings) -> anyhow::Result<ServerHandle> {
    match settings.storage {
        StorageKind::Memory => {
            let stores = MemoryStores::new();
            start_server_on(&settings.host, settings.port, Api::from_stores(&stores)).await
        }
        StorageKind::Sqlite => {
            let path = settings
                .database_path()
                .context("could not determine the database path")?;
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            let store = SqliteStore::open(&path)
                .with_context(|| format!("opening database {}", path.display()))?;
            tracing::info!(path = %path.display(), "opened sqlite database");
            let stores = SqliteStores::new(Arc::new(store));
            start_server_on(&settings.host, settings.port, Api::from_stores(&stores)).await
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    config::load_env_file();
    let args = Args::parse();

    if let Some(dir) = &args.data_dir {
        PathManager::set_data_dir(dir.clone());
    }

    let mut settings = Settings::load();
    args.apply(&mut settings);

    let log_file = if args.no_log_file {
        None
    } else {
        PathManager::log_file_path()
    };
    let _log_guard = logging::init_logging(settings.log_filter.as_deref(), log_file.as_deref());

    let handle = start(&settings).await?;

    println!("cardforge server running at {} ({} storage)", handle.url(), settings.storage);
    println!("Press Ctrl+C to stop");

    tokio::signal::ctrl_c().await?;

    handle.stop();
    Ok(())
}
