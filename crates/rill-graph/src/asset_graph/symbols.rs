//! Used-symbol propagation: computes each asset's used-export set from the
//! demand on its incoming dependency edges, and forwards demand onto its
//! outgoing import edges for downstream dead-code elimination.
//!
//! Dependency demand only grows within a build (demand arrives from several
//! callers over several incremental passes); an asset's own set is replaced
//! wholesale on every recomputation. A global fixpoint holds once every
//! affected asset has been recomputed after its last incoming-edge change,
//! so consumers must read used-symbol sets only after a stable pass.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;

use super::AssetGraph;
use crate::dependency::WILDCARD;
use crate::node::AssetGraphNode;
use crate::node_id::NodeId;

impl AssetGraph {
    /// Recompute `asset_id`'s used-export set and forward demand to its
    /// import edges. No-ops if the id does not name an asset.
    pub fn propagate_used_symbols(&mut self, asset_id: &NodeId) {
        let Some(asset_node) = self.asset(asset_id) else {
            return;
        };
        let export_table = asset_node.asset.symbols.clone();
        // Demand arrives on dependency edges. Direct parents for assets wired
        // straight to a completed dependency; one level further up for the
        // usual dependency -> asset group -> asset shape.
        let mut incoming: Vec<NodeId> = Vec::new();
        for parent in self.parents(asset_id).to_vec() {
            match self.node(&parent) {
                Some(AssetGraphNode::Dependency(_)) => incoming.push(parent),
                Some(AssetGraphNode::AssetGroup(_)) => {
                    incoming.extend(self.parents(&parent).iter().cloned());
                }
                _ => {}
            }
        }
        let outgoing: Vec<NodeId> = self.children(asset_id).to_vec();

        // Inverse export table: local binding name -> exported name.
        let inverse: FxHashMap<String, String> = export_table
            .iter()
            .flatten()
            .map(|s| (s.local.clone(), s.exported.clone()))
            .collect();
        let declares = |name: &str| {
            export_table
                .iter()
                .flatten()
                .any(|s| s.exported == name)
        };

        // Gather demand from incoming dependency edges. Names the export
        // table does not declare must be flowing through a namespace
        // re-export, and are routed onwards rather than consumed here.
        let mut used: FxHashSet<String> = FxHashSet::default();
        let mut namespace_reexport: FxHashSet<String> = FxHashSet::default();
        for dep_id in &incoming {
            let Some(dep) = self.dependency(dep_id) else {
                continue;
            };
            for name in &dep.used_symbols {
                if name == WILDCARD {
                    // Fully re-exported; nothing further from this edge.
                    used.clear();
                    used.insert(WILDCARD.to_string());
                    break;
                } else if declares(name) {
                    used.insert(name.clone());
                } else {
                    namespace_reexport.insert(name.clone());
                }
            }
        }

        // Forward demand onto outgoing import edges.
        let mut grew: Vec<NodeId> = Vec::new();
        for dep_id in &outgoing {
            let Some(dep) = self.dependency(dep_id) else {
                continue;
            };
            let mut demanded: Vec<String> = Vec::new();
            if dep.dependency.has_wildcard_binding() {
                // A namespace re-export cannot be resolved name by name;
                // route the entire unresolved set through it.
                demanded.extend(namespace_reexport.iter().cloned());
            } else {
                for symbol in dep.dependency.symbols.iter().flatten() {
                    if !symbol.is_weak || export_table.is_none() {
                        demanded.push(symbol.exported.clone());
                    } else if let Some(reexported) = inverse.get(&symbol.local) {
                        let satisfied =
                            used.contains(WILDCARD) || used.contains(reexported);
                        if satisfied {
                            demanded.push(symbol.exported.clone());
                            // Credit the re-export to exactly one weak
                            // binding.
                            used.remove(reexported);
                        }
                    }
                }
            }

            if demanded.is_empty() {
                continue;
            }
            let Some(AssetGraphNode::Dependency(dep)) = self.node_mut(dep_id) else {
                continue;
            };
            let before = dep.used_symbols.len();
            dep.used_symbols.extend(demanded);
            if dep.used_symbols.len() > before {
                trace!(dependency = %dep_id, "forwarded symbol demand");
                grew.push(dep_id.clone());
            }
        }

        if let Some(AssetGraphNode::Asset(node)) = self.node_mut(asset_id) {
            node.used_symbols = used;
        }

        // New demand can make a previously deferred group required again.
        for dep_id in grew {
            let groups: Vec<NodeId> = self
                .children(&dep_id)
                .iter()
                .filter(|child| {
                    matches!(
                        self.node(child),
                        Some(AssetGraphNode::AssetGroup(group)) if group.deferred == Some(true)
                    )
                })
                .cloned()
                .collect();
            for group_id in groups {
                self.should_visit_child(&dep_id, &group_id);
            }
        }
    }
}
