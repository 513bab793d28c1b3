//! Generic id-keyed graph storage and its mutation primitives.
//!
//! Nodes live in an id-addressed arena; edges are kept in explicit forward
//! and reverse adjacency lists updated together, so ancestor traversal never
//! has to invert edges on the fly. Edge lists preserve insertion order,
//! which is also traversal and hash order.
//!
//! The graph holds no interior locks. Mutators take `&mut self`; callers
//! serialize mutation externally (see [`crate::AssetGraph`] for the
//! cooperative model this supports).

mod traversal;

pub use traversal::VisitControl;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::node_id::NodeId;

/// Observer invoked once per node actually removed during a cascade.
pub type RemovalObserver<'a, N> = &'a mut dyn FnMut(&NodeId, &N);

/// Directed graph with id-keyed nodes, a designated root, and
/// cascading-removal semantics: a node is removed as soon as an edge
/// replacement leaves it with zero incoming edges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph<N> {
    nodes: FxHashMap<NodeId, N>,
    forward: FxHashMap<NodeId, Vec<NodeId>>,
    reverse: FxHashMap<NodeId, Vec<NodeId>>,
    root: Option<NodeId>,
}

impl<N> Default for Graph<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N> Graph<N> {
    pub fn new() -> Self {
        Self {
            nodes: FxHashMap::default(),
            forward: FxHashMap::default(),
            reverse: FxHashMap::default(),
            root: None,
        }
    }

    /// Designate the root node. The id must already be present.
    pub fn set_root(&mut self, id: NodeId) {
        debug_assert!(self.nodes.contains_key(&id));
        self.root = Some(id);
    }

    pub fn root(&self) -> Option<&NodeId> {
        self.root.as_ref()
    }

    /// Insert a node, keeping any existing node under the same id untouched.
    /// Returns true if the node was newly inserted.
    pub fn add_node(&mut self, id: NodeId, node: N) -> bool {
        match self.nodes.entry(id) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(node);
                true
            }
        }
    }

    pub fn has_node(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node(&self, id: &NodeId) -> Option<&N> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: &NodeId) -> Option<&mut N> {
        self.nodes.get_mut(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Ids of all nodes, in arbitrary order.
    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.keys()
    }

    /// Direct children of a node, in edge insertion order.
    pub fn children(&self, id: &NodeId) -> &[NodeId] {
        self.forward.get(id).map_or(&[], Vec::as_slice)
    }

    /// Direct parents of a node, in edge insertion order.
    pub fn parents(&self, id: &NodeId) -> &[NodeId] {
        self.reverse.get(id).map_or(&[], Vec::as_slice)
    }

    pub fn has_edge(&self, from: &NodeId, to: &NodeId) -> bool {
        self.forward.get(from).is_some_and(|c| c.contains(to))
    }

    /// Add a directed edge. Duplicate edges are ignored.
    pub fn add_edge(&mut self, from: &NodeId, to: &NodeId) {
        let children = self.forward.entry(from.clone()).or_default();
        if children.contains(to) {
            return;
        }
        children.push(to.clone());
        self.reverse.entry(to.clone()).or_default().push(from.clone());
    }

    fn remove_edge_links(&mut self, from: &NodeId, to: &NodeId) {
        if let Some(children) = self.forward.get_mut(from) {
            children.retain(|c| c != to);
        }
        if let Some(parents) = self.reverse.get_mut(to) {
            parents.retain(|p| p != from);
        }
    }

    /// Remove a node, all its edges, and transitively every child left with
    /// no remaining parent. The observer runs once per node actually removed.
    pub fn remove_node(&mut self, id: &NodeId, on_remove: RemovalObserver<'_, N>) {
        let Some(node) = self.nodes.remove(id) else {
            return;
        };

        for parent in self.reverse.remove(id).unwrap_or_default() {
            if let Some(children) = self.forward.get_mut(&parent) {
                children.retain(|c| c != id);
            }
        }

        for child in self.forward.remove(id).unwrap_or_default() {
            let orphaned = match self.reverse.get_mut(&child) {
                Some(parents) => {
                    parents.retain(|p| p != id);
                    parents.is_empty()
                }
                None => false,
            };
            // A cycle back-edge may already have removed the child.
            if orphaned && self.nodes.contains_key(&child) {
                self.remove_node(&child, on_remove);
            }
        }

        on_remove(id, &node);
    }

    /// Diff-and-replace the full child set of `parent` against `desired`.
    ///
    /// Children present on both sides are left untouched, preserving their
    /// mutable state (structural sharing). Children no longer desired lose
    /// their edge and are cascade-removed if that leaves them parentless.
    /// New children are inserted (if their id is unknown) and wired with a
    /// fresh edge. This is the sole topology mutator the domain layer uses.
    pub fn replace_children(
        &mut self,
        parent: &NodeId,
        desired: Vec<(NodeId, N)>,
        on_remove: RemovalObserver<'_, N>,
    ) {
        if !self.nodes.contains_key(parent) {
            return;
        }

        let desired_ids: FxHashSet<&NodeId> = desired.iter().map(|(id, _)| id).collect();
        let stale: Vec<NodeId> = self
            .children(parent)
            .iter()
            .filter(|c| !desired_ids.contains(*c))
            .cloned()
            .collect();

        for child in stale {
            self.remove_edge_links(parent, &child);
            if self.parents(&child).is_empty() {
                self.remove_node(&child, on_remove);
            }
        }

        for (id, node) in desired {
            if !self.nodes.contains_key(&id) {
                self.add_node(id.clone(), node);
            }
            if !self.has_edge(parent, &id) {
                self.add_edge(parent, &id);
            }
        }
    }
}
