//! Shared constants and utilities for storage implementations

use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};

/// Get current unix timestamp in milliseconds
pub fn unix_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

/// Compute SHA-256 hash of text content
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

/// Hash a JSON payload by its compact serialization
///
/// `serde_json` keeps object keys sorted (no `preserve_order`), so equal
/// documents hash equally regardless of the key order they were parsed with.
pub fn json_hash(value: &serde_json::Value) -> String {
    content_hash(&value.to_string())
}
