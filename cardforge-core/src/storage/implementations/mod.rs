//! Storage implementations
//!
//! This module contains concrete implementations of the storage traits.
//!
//! ## Available Implementations
//!
//! - `sqlite/` - SQLite-based storage (requires `sqlite` feature)
//! - `memory/` - In-memory storage

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub mod memory;
