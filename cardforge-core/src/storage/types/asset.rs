//! Asset types for storage

use serde::{Deserialize, Serialize};

use crate::storage::ids::AssetId;
use crate::storage::types::stored::Stored;

/// Metadata of a stored media blob (input form)
///
/// Assets are immutable once created; a transform produces a new asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// Original filename
    pub filename: String,

    /// MIME type of the asset (e.g., "image/png", "audio/mpeg")
    pub mimetype: String,

    /// Size in bytes
    pub size: i64,

    /// Pixel width (images only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,

    /// Pixel height (images only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,

    /// Storage-relative path
    pub url: String,
}

impl Asset {
    /// Create a new asset with required fields
    pub fn new(filename: impl Into<String>, mimetype: impl Into<String>, size: i64) -> Self {
        let filename = filename.into();
        Self {
            url: format!("/assets/{}", filename),
            filename,
            mimetype: mimetype.into(),
            size,
            width: None,
            height: None,
        }
    }

    /// Set pixel dimensions
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Set the storage-relative url
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Lowercased extension of the filename, empty if there is none
    pub fn extension(&self) -> String {
        self.filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default()
    }
}

/// A stored asset with its id and creation timestamp
pub type StoredAsset = Stored<AssetId, Asset>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension() {
        assert_eq!(Asset::new("Portrait.PNG", "image/png", 10).extension(), "png");
        assert_eq!(Asset::new("archive.tar.GZ", "application/gzip", 10).extension(), "gz");
        assert_eq!(Asset::new("README", "text/plain", 10).extension(), "");
    }

    #[test]
    fn test_builder() {
        let asset = Asset::new("bg.webp", "image/webp", 2048)
            .with_dimensions(1920, 1080)
            .with_url("cards/1/bg.webp");
        assert_eq!(asset.width, Some(1920));
        assert_eq!(asset.height, Some(1080));
        assert_eq!(asset.url, "cards/1/bg.webp");
    }
}
