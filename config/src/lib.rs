pub mod paths;
pub mod settings;

pub use paths::PathManager;
pub use settings::{Settings, StorageKind};

/// Load environment variables from .env files.
/// First loads from ~/.env (home directory), then from ./.env (project directory).
/// Project directory values take precedence over home directory values.
/// Call this before parsing CLI args so `CARDFORGE_*` variables reach clap.
pub fn load_env_file() {
    if let Some(home) = dirs::home_dir() {
        dotenv::from_path(home.join(".env")).ok();
    }

    dotenv::dotenv().ok();
}
