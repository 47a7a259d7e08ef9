//! Asset graph service - builds graphs from the stores and persists edits
//!
//! The service is the only graph component that performs I/O. Graph edits
//! follow a load, transform, apply sequence:
//!
//! ```ignore
//! let graph = service.build_graph(&card_id).await?;
//! let next = set_main(&graph, &binding_id);
//! service.apply_changes(&graph, &next).await?;
//! ```
//!
//! Concurrent writers are last-writer-wins per binding row.

use std::collections::{BTreeSet, HashMap};
use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::node::{AssetGraph, AssetGraphNode, JoinedAsset};
use super::query::{GraphSummary, summarize};
use super::validate::{ValidationIssue, validate_graph};
use super::mutate::set_main;
use crate::error::{CardError, CardResult};
use crate::media;
use crate::storage::ids::{AssetId, BindingId, CardId};
use crate::storage::traits::{AssetStore, BindingStore, CardStore, StorageTypes, Stores};
use crate::storage::types::binding::{BindingPatch, NewBinding, TAG_ANIMATED};

/// Counts of rows written by [`AssetGraphService::apply_changes`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    pub updated: usize,
    pub deleted: usize,
}

/// Row-level difference between two graphs of the same card
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphChanges {
    pub updates: Vec<(BindingId, BindingPatch)>,
    pub deletions: Vec<BindingId>,
}

impl GraphChanges {
    /// Compare `old` and `new` node by node
    ///
    /// Nodes only in `new` are ignored: graph mutations cannot create
    /// bindings, so such nodes have no row to write to.
    pub fn between(old: &AssetGraph, new: &AssetGraph) -> Self {
        let mut changes = Self::default();

        for before in old.iter() {
            let Some(after) = new.node(before.id()) else {
                changes.deletions.push(before.id().clone());
                continue;
            };
            let patch = patch_between(before, after);
            if !patch.is_empty() {
                changes.updates.push((before.id().clone(), patch));
            }
        }

        changes
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty() && self.deletions.is_empty()
    }
}

fn patch_between(before: &AssetGraphNode, after: &AssetGraphNode) -> BindingPatch {
    let (b, a) = (&before.binding, &after.binding);
    BindingPatch {
        role: (b.role != a.role).then(|| a.role.clone()),
        name: (b.name != a.name).then(|| a.name.clone()),
        order: (b.order != a.order).then_some(a.order),
        is_main: (b.is_main != a.is_main).then_some(a.is_main),
        tags: (b.tags != a.tags).then(|| a.tags.clone()),
    }
}

/// A graph bundled with its summary and validation report
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphReport {
    #[serde(flatten)]
    pub graph: AssetGraph,
    pub summary: GraphSummary,
    pub validation: Vec<ValidationIssue>,
}

impl GraphReport {
    pub fn of(graph: AssetGraph) -> Self {
        Self {
            summary: summarize(&graph),
            validation: validate_graph(&graph),
            graph,
        }
    }
}

/// Request to bind an existing asset to a card
#[derive(Debug, Clone)]
pub struct AttachAsset {
    pub asset_id: AssetId,
    pub role: String,
    /// Defaults to the asset's filename without extension
    pub name: Option<String>,
    pub is_main: bool,
    pub tags: BTreeSet<String>,
    /// Raw media bytes, sniffed for animation when present
    pub content: Option<Vec<u8>>,
}

impl AttachAsset {
    pub fn new(asset_id: AssetId, role: impl Into<String>) -> Self {
        Self {
            asset_id,
            role: role.into(),
            name: None,
            is_main: false,
            tags: BTreeSet::new(),
            content: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
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

    pub fn with_content(mut self, content: Vec<u8>) -> Self {
        self.content = Some(content);
        self
    }
}

/// Builds asset graphs from the stores and writes graph edits back.
///
/// Generic over `S: StorageTypes`, like the stores it wraps.
pub struct AssetGraphService<S: StorageTypes> {
    card_store: Arc<S::Card>,
    asset_store: Arc<S::Asset>,
    binding_store: Arc<S::Binding>,
    _marker: PhantomData<S>,
}

impl<S: StorageTypes> Clone for AssetGraphService<S> {
    fn clone(&self) -> Self {
        Self {
            card_store: self.card_store.clone(),
            asset_store: self.asset_store.clone(),
            binding_store: self.binding_store.clone(),
            _marker: PhantomData,
        }
    }
}

impl<S: StorageTypes> AssetGraphService<S> {
    pub fn from_stores(stores: &impl Stores<S>) -> Self {
        Self::new(stores.card(), stores.asset(), stores.binding())
    }

    pub fn new(
        card_store: Arc<S::Card>,
        asset_store: Arc<S::Asset>,
        binding_store: Arc<S::Binding>,
    ) -> Self {
        Self {
            card_store,
            asset_store,
            binding_store,
            _marker: PhantomData,
        }
    }

    /// Load every binding of a card and join it with its asset
    ///
    /// Bindings whose asset is missing are kept as broken nodes.
    pub async fn build_graph(&self, card_id: &CardId) -> CardResult<AssetGraph> {
        let card = self
            .card_store
            .get_card(card_id)
            .await?
            .ok_or_else(|| CardError::not_found("card", card_id))?;

        let bindings = self.binding_store.list_bindings_by_card(card_id).await?;

        let mut assets: HashMap<AssetId, Option<JoinedAsset>> = HashMap::new();
        let mut nodes = Vec::with_capacity(bindings.len());
        for binding in bindings {
            if !assets.contains_key(&binding.asset_id) {
                let asset = self.asset_store.get(&binding.asset_id).await?;
                if asset.is_none() {
                    warn!(
                        card_id = %card_id,
                        binding_id = %binding.id,
                        asset_id = %binding.asset_id,
                        "binding references a missing asset"
                    );
                }
                assets.insert(binding.asset_id.clone(), asset.as_ref().map(JoinedAsset::from));
            }
            let asset = assets.get(&binding.asset_id).cloned().flatten();
            nodes.push(AssetGraphNode::new(binding, asset));
        }

        debug!(card_id = %card_id, nodes = nodes.len(), "built asset graph");
        Ok(AssetGraph::new(card_id.clone(), card.actor_count, nodes))
    }

    /// Build the graph together with its summary and validation report
    pub async fn report(&self, card_id: &CardId) -> CardResult<GraphReport> {
        Ok(GraphReport::of(self.build_graph(card_id).await?))
    }

    /// Persist the difference between `old` and `new`
    ///
    /// Updates are written as one batch; nodes missing from `new` are
    /// deleted. Rows that vanished since `old` was loaded are skipped.
    pub async fn apply_changes(
        &self,
        old: &AssetGraph,
        new: &AssetGraph,
    ) -> CardResult<ApplyReport> {
        if old.card_id != new.card_id {
            return Err(CardError::validation(
                "graph",
                format!("graphs belong to different cards: {} and {}", old.card_id, new.card_id),
            ));
        }

        let changes = GraphChanges::between(old, new);
        if changes.is_empty() {
            debug!(card_id = %old.card_id, "no asset graph changes to apply");
            return Ok(ApplyReport::default());
        }

        let mut report = ApplyReport::default();
        if !changes.updates.is_empty() {
            report.updated = self.binding_store.update_bindings(changes.updates).await?;
        }
        for id in &changes.deletions {
            if self.binding_store.delete_binding(id).await? {
                report.deleted += 1;
            }
        }

        info!(
            card_id = %old.card_id,
            updated = report.updated,
            deleted = report.deleted,
            "applied asset graph changes"
        );
        Ok(report)
    }

    /// Load, transform and persist in one step, returning the new graph
    pub async fn update_graph<F>(
        &self,
        card_id: &CardId,
        transform: F,
    ) -> CardResult<(AssetGraph, ApplyReport)>
    where
        F: FnOnce(&AssetGraph) -> CardResult<AssetGraph> + Send,
    {
        let graph = self.build_graph(card_id).await?;
        let next = transform(&graph)?;
        let report = self.apply_changes(&graph, &next).await?;
        Ok((next, report))
    }

    /// Bind an existing asset to a card, appended at the end of the order
    ///
    /// When content bytes are supplied they are sniffed once and an
    /// `animated` tag is cached on the binding. A main attachment demotes
    /// the other nodes of its role.
    pub async fn attach_asset(
        &self,
        card_id: &CardId,
        request: AttachAsset,
    ) -> CardResult<AssetGraphNode> {
        if self.card_store.get_card(card_id).await?.is_none() {
            return Err(CardError::not_found("card", card_id));
        }
        let asset = self
            .asset_store
            .get(&request.asset_id)
            .await?
            .ok_or_else(|| CardError::not_found("asset", &request.asset_id))?;

        let ext = asset.extension();
        let name = request.name.unwrap_or_else(|| {
            asset
                .filename
                .rsplit_once('.')
                .map_or(asset.filename.as_str(), |(stem, _)| stem)
                .to_string()
        });

        let mut binding = NewBinding::new(card_id.clone(), request.asset_id.clone(), request.role, name)
            .with_ext(&ext);
        binding.tags = request.tags;
        if request.is_main {
            binding = binding.main();
        }
        if let Some(content) = &request.content {
            if media::is_animated(&asset.mimetype, content) {
                binding = binding.with_tag(TAG_ANIMATED);
            }
        }

        let created = self.binding_store.create_binding(binding).await?;
        info!(
            card_id = %card_id,
            binding_id = %created.id,
            asset_id = %created.asset_id,
            role = %created.role,
            "attached asset"
        );

        if created.is_main {
            let graph = self.build_graph(card_id).await?;
            let next = set_main(&graph, &created.id);
            self.apply_changes(&graph, &next).await?;
        }

        Ok(AssetGraphNode::new(created, Some(JoinedAsset::from(&asset))))
    }

    /// Remove a binding from a card; the asset itself is kept
    pub async fn detach_asset(&self, card_id: &CardId, binding_id: &BindingId) -> CardResult<()> {
        match self.binding_store.get_binding(binding_id).await? {
            Some(binding) if &binding.card_id == card_id => {
                self.binding_store.delete_binding(binding_id).await?;
                info!(card_id = %card_id, binding_id = %binding_id, "detached asset");
                Ok(())
            }
            _ => Err(CardError::not_found("binding", binding_id)),
        }
    }
}
