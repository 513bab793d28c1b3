//! The resolution state machine: five idempotent, re-entrant mutators that
//! advance an entry specifier through file resolution, target generation,
//! transformation, and per-asset dependency wiring.
//!
//! Each mutator stamps its target node's `corresponding_request` for the
//! external invalidation layer, then rewires children through the
//! child-replacement primitive. `resolve_entry` and `resolve_targets`
//! require their target node to exist; its absence is an upstream
//! scheduling defect. `resolve_dependency` and `resolve_asset_group`
//! tolerate a target removed by a concurrent edit and no-op.

use rustc_hash::FxHashSet;
use tracing::debug;

use super::AssetGraph;
use crate::asset::{AssetGroup, AssetRecord};
use crate::dependency::DependencyDescriptor;
use crate::entry::{Entry, Target};
use crate::node::{AssetGraphNode, DependencyNode};
use crate::node_id::NodeId;
use crate::{Error, Result};

impl AssetGraph {
    /// Record the entry files a specifier resolved to.
    pub fn resolve_entry(
        &mut self,
        specifier: &str,
        resolved: Vec<Entry>,
        request_id: Option<String>,
    ) -> Result<()> {
        let specifier_id = NodeId::entry_specifier(specifier);
        match self.node_mut(&specifier_id) {
            Some(node @ AssetGraphNode::EntrySpecifier(_)) => {
                node.set_corresponding_request(request_id);
            }
            _ => return Err(Error::MissingNode(specifier_id)),
        }
        debug!(specifier, files = resolved.len(), "resolved entry");

        let children = resolved
            .into_iter()
            .map(|entry| (entry.content_key(), AssetGraphNode::entry_file(entry)))
            .collect();
        self.replace_children(&specifier_id, children);
        Ok(())
    }

    /// Record the targets an entry file is built for, one synthetic
    /// dependency per target. Library targets have their entry exports all
    /// considered consumed, so their dependency demand starts at `'*'`.
    pub fn resolve_targets(
        &mut self,
        entry: &Entry,
        targets: Vec<Target>,
        request_id: Option<String>,
    ) -> Result<()> {
        let entry_id = entry.content_key();
        match self.node_mut(&entry_id) {
            Some(node @ AssetGraphNode::EntryFile(_)) => {
                node.set_corresponding_request(request_id);
            }
            _ => return Err(Error::MissingNode(entry_id)),
        }
        debug!(entry = %entry.file_path, targets = targets.len(), "resolved targets");

        let children = targets
            .into_iter()
            .map(|target| {
                let mut node = DependencyNode::new(DependencyDescriptor::entry(entry, target));
                node.preflight_library_usage();
                (node.dependency.id.clone(), AssetGraphNode::Dependency(node))
            })
            .collect();
        self.replace_children(&entry_id, children);
        Ok(())
    }

    /// Record what a dependency resolved to: one asset group, or nothing
    /// for external / unresolved imports.
    ///
    /// Tolerates the dependency node having been removed concurrently.
    pub fn resolve_dependency(
        &mut self,
        dependency_id: &NodeId,
        asset_group: Option<AssetGroup>,
        request_id: Option<String>,
    ) -> Result<()> {
        match self.node_mut(dependency_id) {
            Some(node @ AssetGraphNode::Dependency(_)) => {
                node.set_corresponding_request(request_id);
            }
            _ => {
                debug!(dependency = %dependency_id, "dependency gone before resolution, skipping");
                return Ok(());
            }
        }

        let Some(group) = asset_group else {
            return Ok(());
        };
        let group_id = group.content_key();
        self.replace_children(
            dependency_id,
            vec![(group_id.clone(), AssetGraphNode::asset_group(group))],
        );
        // Keep deferral state consistent with current symbol demand.
        self.should_visit_child(dependency_id, &group_id);
        Ok(())
    }

    /// Record the flat batch of assets one group transformed into.
    ///
    /// Batch members referenced by another member's import specifier
    /// (matched against `unique_key`) are nested: they hang off the
    /// referencing dependency rather than directly off the group. Everything
    /// else is wired as a direct child, then every batch member has its own
    /// dependencies resolved.
    ///
    /// Tolerates the group node having been removed concurrently.
    pub fn resolve_asset_group(
        &mut self,
        group: &AssetGroup,
        assets: Vec<AssetRecord>,
        request_id: Option<String>,
    ) -> Result<()> {
        let group_id = group.content_key();
        match self.node_mut(&group_id) {
            Some(node @ AssetGraphNode::AssetGroup(_)) => {
                node.set_corresponding_request(request_id);
            }
            _ => {
                debug!(group = %group_id, "asset group gone before transform completed, skipping");
                return Ok(());
            }
        }
        debug!(group = %group.file_path, assets = assets.len(), "resolved asset group");

        let mut nested: FxHashSet<NodeId> = FxHashSet::default();
        for asset in &assets {
            for dep in &asset.dependencies {
                let referenced = assets
                    .iter()
                    .find(|a| a.unique_key.as_deref() == Some(dep.specifier.as_str()));
                if let Some(referenced) = referenced {
                    nested.insert(referenced.id.clone());
                }
            }
        }

        let direct = assets
            .iter()
            .filter(|asset| !nested.contains(&asset.id))
            .map(|asset| (asset.id.clone(), AssetGraphNode::asset(asset.clone())))
            .collect();
        self.replace_children(&group_id, direct);

        for asset in &assets {
            self.resolve_asset(asset, &assets);
        }
        Ok(())
    }

    /// Wire an asset's import declarations as dependency children.
    ///
    /// When the batch already contains the imported asset (matched by
    /// identity key), the dependency is marked complete and wired straight
    /// to that asset, skipping a resolution round-trip, and symbol demand is
    /// propagated through the completed edge.
    pub fn resolve_asset(&mut self, asset: &AssetRecord, dependent_assets: &[AssetRecord]) {
        if !self.has_node(&asset.id) {
            // Nested assets are first seen here, ahead of the edge their
            // referencing dependency will add below.
            self.add_node(asset.id.clone(), AssetGraphNode::asset(asset.clone()));
        }

        let mut dep_children = Vec::with_capacity(asset.dependencies.len());
        let mut completed: Vec<(NodeId, AssetRecord)> = Vec::new();
        for dep in &asset.dependencies {
            let descriptor = dep.clone().with_source_asset(asset.id.clone());
            let dep_id = descriptor.id.clone();

            let in_batch = dependent_assets
                .iter()
                .find(|a| a.unique_key.as_deref() == Some(dep.specifier.as_str()));
            if let Some(target) = in_batch {
                completed.push((dep_id.clone(), target.clone()));
            }
            dep_children.push((dep_id, AssetGraphNode::dependency(descriptor)));
        }
        self.replace_children(&asset.id, dep_children);

        for (dep_id, target) in completed {
            if let Some(AssetGraphNode::Dependency(node)) = self.node_mut(&dep_id) {
                node.complete = true;
            }
            let target_id = target.id.clone();
            self.replace_children(&dep_id, vec![(target_id.clone(), AssetGraphNode::asset(target))]);
            self.propagate_used_symbols(&target_id);
        }
    }
}
