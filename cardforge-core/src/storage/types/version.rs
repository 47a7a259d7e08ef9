//! Version snapshot types

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::storage::ids::{CardId, VersionId};

/// Immutable copy of a card's data payload at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionSnapshot {
    pub id: VersionId,
    pub card_id: CardId,
    /// Monotonically increasing per card, starting at 1
    pub version_number: i64,
    pub message: String,
    pub data: Value,
    /// SHA-256 of the compact JSON payload
    pub content_hash: String,
    pub created_at: i64,
}

/// Listing form of a snapshot, without the payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    pub id: VersionId,
    pub version_number: i64,
    pub message: String,
    pub content_hash: String,
    pub created_at: i64,
}

impl From<&VersionSnapshot> for VersionInfo {
    fn from(v: &VersionSnapshot) -> Self {
        Self {
            id: v.id.clone(),
            version_number: v.version_number,
            message: v.message.clone(),
            content_hash: v.content_hash.clone(),
            created_at: v.created_at,
        }
    }
}
