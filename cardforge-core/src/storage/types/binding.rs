//! Card/asset binding types
//!
//! A binding attaches one asset to one card under a role (`type` on the wire).
//! Tags are a set of free-form strings; a few prefixes are reserved:
//! `emotion:`, `state:`, `variant:`, `actor:<N>` and the bare `animated`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::storage::ids::{AssetId, BindingId, CardId};

pub const ROLE_ICON: &str = "icon";
pub const ROLE_BACKGROUND: &str = "background";

pub const TAG_ANIMATED: &str = "animated";
pub const ACTOR_TAG_PREFIX: &str = "actor:";
pub const EMOTION_TAG_PREFIX: &str = "emotion:";
pub const STATE_TAG_PREFIX: &str = "state:";
pub const VARIANT_TAG_PREFIX: &str = "variant:";

/// Parse an `actor:<N>` tag, where N is a positive integer
pub fn parse_actor_tag(tag: &str) -> Option<u32> {
    let digits = tag.strip_prefix(ACTOR_TAG_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u32>().ok().filter(|n| *n >= 1)
}

/// Format the tag binding an asset to an actor slot
pub fn actor_tag(index: u32) -> String {
    format!("{ACTOR_TAG_PREFIX}{index}")
}

/// A persisted binding row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardAssetBinding {
    pub id: BindingId,
    pub card_id: CardId,
    pub asset_id: AssetId,
    /// Role tag (`icon`, `background`, `emotion`, `sound`, ...)
    #[serde(rename = "type")]
    pub role: String,
    pub name: String,
    /// Lowercased file extension
    pub ext: String,
    pub order: i64,
    pub is_main: bool,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl CardAssetBinding {
    /// Actor slot this binding is attached to, if any
    pub fn actor(&self) -> Option<u32> {
        self.tags.iter().find_map(|t| parse_actor_tag(t))
    }
}

/// Input for creating a binding; `order` is assigned by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBinding {
    pub card_id: CardId,
    pub asset_id: AssetId,
    pub role: String,
    pub name: String,
    pub ext: String,
    pub is_main: bool,
    pub tags: BTreeSet<String>,
}

impl NewBinding {
    pub fn new(
        card_id: CardId,
        asset_id: AssetId,
        role: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            card_id,
            asset_id,
            role: role.into(),
            name: name.into(),
            ext: String::new(),
            is_main: false,
            tags: BTreeSet::new(),
        }
    }

    /// Set the extension (stored lowercased)
    pub fn with_ext(mut self, ext: impl AsRef<str>) -> Self {
        self.ext = ext.as_ref().to_lowercase();
        self
    }

    pub fn main(mut self) -> Self {
        self.is_main = true;
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }
}

/// Partial update of the mutable binding fields
///
/// `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingPatch {
    pub role: Option<String>,
    pub name: Option<String>,
    pub order: Option<i64>,
    pub is_main: Option<bool>,
    pub tags: Option<BTreeSet<String>>,
}

impl BindingPatch {
    pub fn is_empty(&self) -> bool {
        self.role.is_none()
            && self.name.is_none()
            && self.order.is_none()
            && self.is_main.is_none()
            && self.tags.is_none()
    }

    /// Apply the patch to a binding in place
    pub fn apply_to(&self, binding: &mut CardAssetBinding) {
        if let Some(role) = &self.role {
            binding.role = role.clone();
        }
        if let Some(name) = &self.name {
            binding.name = name.clone();
        }
        if let Some(order) = self.order {
            binding.order = order;
        }
        if let Some(is_main) = self.is_main {
            binding.is_main = is_main;
        }
        if let Some(tags) = &self.tags {
            binding.tags = tags.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_actor_tag() {
        assert_eq!(parse_actor_tag("actor:1"), Some(1));
        assert_eq!(parse_actor_tag("actor:12"), Some(12));
        assert_eq!(parse_actor_tag("actor:0"), None);
        assert_eq!(parse_actor_tag("actor:-1"), None);
        assert_eq!(parse_actor_tag("actor:+2"), None);
        assert_eq!(parse_actor_tag("actor:"), None);
        assert_eq!(parse_actor_tag("actor:two"), None);
        assert_eq!(parse_actor_tag("emotion:happy"), None);
    }

    #[test]
    fn test_new_binding_lowercases_ext() {
        let b = NewBinding::new(CardId::new(), AssetId::new(), "icon", "main").with_ext("PNG");
        assert_eq!(b.ext, "png");
    }

    #[test]
    fn test_patch_apply() {
        let mut binding = CardAssetBinding {
            id: BindingId::from_string("b1"),
            card_id: CardId::from_string("c1"),
            asset_id: AssetId::from_string("a1"),
            role: "icon".into(),
            name: "main".into(),
            ext: "png".into(),
            order: 0,
            is_main: false,
            tags: BTreeSet::new(),
        };
        let patch = BindingPatch {
            order: Some(3),
            is_main: Some(true),
            ..Default::default()
        };
        assert!(!patch.is_empty());
        patch.apply_to(&mut binding);
        assert_eq!(binding.order, 3);
        assert!(binding.is_main);
        assert_eq!(binding.name, "main");
        assert!(BindingPatch::default().is_empty());
    }

    #[test]
    fn test_binding_wire_format() {
        let binding = CardAssetBinding {
            id: BindingId::from_string("b1"),
            card_id: CardId::from_string("c1"),
            asset_id: AssetId::from_string("a1"),
            role: "background".into(),
            name: "forest".into(),
            ext: "webp".into(),
            order: 2,
            is_main: true,
            tags: [actor_tag(2)].into_iter().collect(),
        };
        let json = serde_json::to_value(&binding).unwrap();
        assert_eq!(json["type"], "background");
        assert_eq!(json["isMain"], true);
        assert_eq!(json["cardId"], "c1");
        assert_eq!(json["tags"][0], "actor:2");
        assert_eq!(binding.actor(), Some(2));
    }
}
