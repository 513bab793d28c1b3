//! The domain asset graph: resolution state machine, symbol propagation,
//! deferral, hashing, and snapshots over the generic graph store.
//!
//! Mutation is single-threaded and cooperative: an external scheduler
//! serializes all mutating calls against one graph instance, each call
//! corresponding to one completed asynchronous resolution step. Calls arrive
//! in arbitrary order relative to sibling subtrees.

mod deferral;
mod hashing;
mod resolution;
mod serialization;
mod symbols;

use std::fmt;

use tracing::debug;

use crate::graph::{Graph, VisitControl};
use crate::node::{AssetGraphNode, AssetNode, DependencyNode};
use crate::node_id::NodeId;

/// Observer invoked for every node removed by a cascading removal, letting
/// the cache-invalidation layer drop state keyed by node id.
pub type NodeRemovedObserver = Box<dyn FnMut(&NodeId, &AssetGraphNode)>;

/// Incrementally maintained graph from entry specifiers down to compiled
/// assets.
///
/// Topology only ever changes through the child-replacement primitive, so
/// re-resolving unchanged logical content reuses existing nodes and their
/// mutable derived state (structural sharing).
pub struct AssetGraph {
    graph: Graph<AssetGraphNode>,
    /// Memoized whole-graph content digest; `None` after any structural edit.
    hash: Option<String>,
    safe_to_incrementally_bundle: bool,
    on_node_removed: Option<NodeRemovedObserver>,
}

impl Default for AssetGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AssetGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetGraph")
            .field("nodes", &self.graph.node_count())
            .field("hash", &self.hash)
            .field(
                "safe_to_incrementally_bundle",
                &self.safe_to_incrementally_bundle,
            )
            .finish_non_exhaustive()
    }
}

impl AssetGraph {
    /// Create an empty graph holding only the root node.
    pub fn new() -> Self {
        let mut graph = Graph::new();
        let root = NodeId::root();
        graph.add_node(root.clone(), AssetGraphNode::Root);
        graph.set_root(root);
        Self {
            graph,
            hash: None,
            safe_to_incrementally_bundle: true,
            on_node_removed: None,
        }
    }

    /// Create an empty graph with a node-removal observer attached.
    pub fn with_observer(observer: NodeRemovedObserver) -> Self {
        let mut this = Self::new();
        this.on_node_removed = Some(observer);
        this
    }

    /// Attach or replace the node-removal observer.
    pub fn set_observer(&mut self, observer: NodeRemovedObserver) {
        self.on_node_removed = Some(observer);
    }

    /// Wire the root to one entry specifier node per raw specifier.
    pub fn set_entries(&mut self, specifiers: impl IntoIterator<Item = String>) {
        let root = NodeId::root();
        let children = specifiers
            .into_iter()
            .map(|specifier| {
                (
                    NodeId::entry_specifier(&specifier),
                    AssetGraphNode::entry_specifier(specifier),
                )
            })
            .collect();
        self.replace_children(&root, children);
    }

    // --- read side -------------------------------------------------------

    pub fn root_id(&self) -> NodeId {
        NodeId::root()
    }

    pub fn has_node(&self, id: &NodeId) -> bool {
        self.graph.has_node(id)
    }

    pub fn node(&self, id: &NodeId) -> Option<&AssetGraphNode> {
        self.graph.node(id)
    }

    pub fn node_mut(&mut self, id: &NodeId) -> Option<&mut AssetGraphNode> {
        self.graph.node_mut(id)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Direct children of a node, in edge order.
    pub fn children(&self, id: &NodeId) -> &[NodeId] {
        self.graph.children(id)
    }

    /// Direct parents of a node, in edge order.
    pub fn parents(&self, id: &NodeId) -> &[NodeId] {
        self.graph.parents(id)
    }

    /// The asset node under `id`, if that id names an asset.
    pub fn asset(&self, id: &NodeId) -> Option<&AssetNode> {
        match self.graph.node(id) {
            Some(AssetGraphNode::Asset(node)) => Some(node),
            _ => None,
        }
    }

    /// The dependency node under `id`, if that id names a dependency.
    pub fn dependency(&self, id: &NodeId) -> Option<&DependencyNode> {
        match self.graph.node(id) {
            Some(AssetGraphNode::Dependency(node)) => Some(node),
            _ => None,
        }
    }

    /// First asset reached on each branch from the root; these are the
    /// assets entry dependencies resolved to.
    pub fn entry_assets(&self) -> Vec<&AssetNode> {
        let root = self.root_id();
        let mut ids = Vec::new();
        self.graph.filtered_traverse(
            &root,
            (),
            |_, node| match node {
                AssetGraphNode::Asset(_) => Some(()),
                _ => None,
            },
            |id, (), _| {
                ids.push(id.clone());
                VisitControl::SkipChildren
            },
        );
        ids.iter().filter_map(|id| self.asset(id)).collect()
    }

    /// All dependency ancestors of an asset, transitively.
    ///
    /// The walk deliberately continues past the nearest dependency per
    /// branch, so dependencies higher up a re-export chain are included.
    pub fn incoming_dependencies(&self, asset_id: &NodeId) -> Vec<NodeId> {
        self.graph.find_ancestors(asset_id, |_, node| {
            matches!(node, AssetGraphNode::Dependency(_))
        })
    }

    /// Visit every reachable, non-deferred asset in depth-first edge order.
    ///
    /// Subtrees behind a currently-deferred asset group are pruned, not
    /// removed; they are revisited once a symbol-usage update un-defers the
    /// group.
    pub fn traverse_assets<F>(&self, mut visit: F)
    where
        F: FnMut(&NodeId, &AssetNode),
    {
        let root = self.root_id();
        self.graph.traverse(&root, (), |id, node, _| match node {
            AssetGraphNode::AssetGroup(group) if group.deferred == Some(true) => {
                VisitControl::SkipChildren
            }
            AssetGraphNode::Asset(asset) => {
                visit(id, asset);
                VisitControl::Continue(())
            }
            _ => VisitControl::Continue(()),
        });
    }

    /// Whether deferral state has stayed stable since the last reset,
    /// i.e. the previous bundle graph may be reused incrementally.
    pub fn safe_to_incrementally_bundle(&self) -> bool {
        self.safe_to_incrementally_bundle
    }

    /// Reset the incremental-bundling flag at the start of a pass.
    pub fn reset_safe_to_incrementally_bundle(&mut self) {
        self.safe_to_incrementally_bundle = true;
    }

    // --- write side ------------------------------------------------------

    /// Remove a node and cascade removal through orphaned descendants.
    pub fn remove_node(&mut self, id: &NodeId) {
        self.hash = None;
        let observer = &mut self.on_node_removed;
        self.graph.remove_node(id, &mut |removed, node| {
            debug!(node = %removed, kind = node.kind(), "node removed from asset graph");
            if let Some(observer) = observer.as_mut() {
                observer(removed, node);
            }
        });
    }

    /// Child-replacement primitive with hash invalidation and removal
    /// observation layered on. All resolvers mutate topology through here.
    pub(crate) fn replace_children(
        &mut self,
        parent: &NodeId,
        desired: Vec<(NodeId, AssetGraphNode)>,
    ) {
        self.hash = None;
        let observer = &mut self.on_node_removed;
        self.graph.replace_children(parent, desired, &mut |removed, node| {
            debug!(node = %removed, kind = node.kind(), "node removed from asset graph");
            if let Some(observer) = observer.as_mut() {
                observer(removed, node);
            }
        });
    }

    pub(crate) fn add_node(&mut self, id: NodeId, node: AssetGraphNode) -> bool {
        self.hash = None;
        self.graph.add_node(id, node)
    }

    pub(crate) fn graph(&self) -> &Graph<AssetGraphNode> {
        &self.graph
    }
}
