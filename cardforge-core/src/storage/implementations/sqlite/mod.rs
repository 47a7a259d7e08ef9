//! SQLite storage backend
//!
//! Provides `SqliteStore` - a shared SQLite connection wrapper that
//! implements every storage trait.
//!
//! All trait implementations are in submodules:
//! - `asset` - AssetStore impl
//! - `binding` - BindingStore impl
//! - `card` - CardStore impl
//! - `version` - VersionStore impl

use anyhow::{Result, anyhow};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::storage::traits::{StorageTypes, Stores};

mod asset;
mod binding;
mod card;
mod version;

pub(crate) use asset::init_schema as init_asset_schema;
pub(crate) use binding::init_schema as init_binding_schema;
pub(crate) use card::init_schema as init_card_schema;
pub(crate) use version::init_schema as init_version_schema;

/// Shared SQLite connection
///
/// Create one store and share it via `Arc` across everything that needs
/// database access.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open or create a SQLite database at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(&path)?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory SQLite database (useful for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Lock the connection for a trait implementation
    pub(crate) fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("sqlite connection lock poisoned"))
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn()?;
        init_card_schema(&conn)?;
        init_asset_schema(&conn)?;
        init_binding_schema(&conn)?;
        init_version_schema(&conn)?;
        Ok(())
    }
}

/// Storage configuration where every store is the one `SqliteStore`
pub struct SqliteStorage;

impl StorageTypes for SqliteStorage {
    type Card = SqliteStore;
    type Asset = SqliteStore;
    type Binding = SqliteStore;
    type Version = SqliteStore;
}

/// Hands out the shared `SqliteStore` for every store accessor
#[derive(Clone)]
pub struct SqliteStores {
    sqlite: Arc<SqliteStore>,
}

impl SqliteStores {
    pub fn new(sqlite: Arc<SqliteStore>) -> Self {
        Self { sqlite }
    }
}

impl Stores<SqliteStorage> for SqliteStores {
    fn card(&self) -> Arc<SqliteStore> {
        self.sqlite.clone()
    }

    fn asset(&self) -> Arc<SqliteStore> {
        self.sqlite.clone()
    }

    fn binding(&self) -> Arc<SqliteStore> {
        self.sqlite.clone()
    }

    fn version(&self) -> Arc<SqliteStore> {
        self.sqlite.clone()
    }
}

/// Map a JSON decode failure inside a row mapper to a rusqlite error
pub(crate) fn json_column_error(index: usize, err: serde_json::Error) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(index, rusqlite::types::Type::Text, Box::new(err))
}
