use serde::Serialize;

use crate::storage::ids::{BindingId, CardId};
use crate::storage::types::binding::{CardAssetBinding, TAG_ANIMATED};
use crate::storage::types::StoredAsset;

/// Asset metadata carried on a graph node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinedAsset {
    pub mimetype: String,
    pub size: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    pub url: String,
}

impl From<&StoredAsset> for JoinedAsset {
    fn from(asset: &StoredAsset) -> Self {
        Self {
            mimetype: asset.mimetype.clone(),
            size: asset.size,
            width: asset.width,
            height: asset.height,
            url: asset.url.clone(),
        }
    }
}

/// A binding joined with its asset
///
/// `asset` is `None` when the binding references an asset that no longer
/// exists. Such nodes stay in the graph and surface as validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetGraphNode {
    #[serde(flatten)]
    pub binding: CardAssetBinding,
    #[serde(flatten)]
    pub asset: Option<JoinedAsset>,
    pub broken: bool,
}

impl AssetGraphNode {
    pub fn new(binding: CardAssetBinding, asset: Option<JoinedAsset>) -> Self {
        let broken = asset.is_none();
        Self {
            binding,
            asset,
            broken,
        }
    }

    pub fn id(&self) -> &BindingId {
        &self.binding.id
    }

    pub fn role(&self) -> &str {
        &self.binding.role
    }

    pub fn order(&self) -> i64 {
        self.binding.order
    }

    pub fn is_main(&self) -> bool {
        self.binding.is_main
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.binding.tags.contains(tag)
    }

    pub fn is_broken(&self) -> bool {
        self.asset.is_none()
    }

    pub fn mimetype(&self) -> Option<&str> {
        self.asset.as_ref().map(|a| a.mimetype.as_str())
    }

    /// Actor slot from the first well-formed `actor:<N>` tag
    pub fn actor(&self) -> Option<u32> {
        self.binding.actor()
    }

    pub fn is_animated(&self) -> bool {
        self.has_tag(TAG_ANIMATED)
            || self
                .mimetype()
                .is_some_and(crate::media::is_animated_mimetype)
    }

    /// Values of all tags starting with `prefix`, e.g. `emotion:` gives `["happy"]`
    pub fn tag_values<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.binding
            .tags
            .iter()
            .filter_map(move |t| t.strip_prefix(prefix))
    }
}

/// Every binding of one card, ordered by `(order, id)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetGraph {
    pub card_id: CardId,
    /// Number of actor slots the card declares
    pub actor_count: u32,
    pub nodes: Vec<AssetGraphNode>,
}

impl AssetGraph {
    pub fn new(card_id: CardId, actor_count: u32, mut nodes: Vec<AssetGraphNode>) -> Self {
        nodes.sort_by(|a, b| a.order().cmp(&b.order()).then_with(|| a.id().cmp(b.id())));
        Self {
            card_id,
            actor_count,
            nodes,
        }
    }

    /// A graph for the same card with different nodes
    pub(crate) fn with_nodes(&self, nodes: Vec<AssetGraphNode>) -> Self {
        Self::new(self.card_id.clone(), self.actor_count, nodes)
    }

    pub fn node(&self, id: &BindingId) -> Option<&AssetGraphNode> {
        self.nodes.iter().find(|n| n.id() == id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AssetGraphNode> {
        self.nodes.iter()
    }
}
