//! Deferral: skipping the transform of side-effect-free module groups whose
//! exports nothing currently demands, and keeping the ancestor-propagated
//! `has_deferred` flags consistent as deferral toggles.
//!
//! Deferred subtrees stay in the graph; traversal prunes them and they come
//! back automatically once a symbol-usage update makes them required.

use rustc_hash::FxHashSet;
use tracing::trace;

use super::AssetGraph;
use crate::graph::VisitControl;
use crate::node::AssetGraphNode;
use crate::node_id::NodeId;

impl AssetGraph {
    /// Request-side walk from the root that re-evaluates the deferral
    /// decision at every dependency → asset-group edge before descending,
    /// so flags stay consistent while an incremental pass revisits the
    /// graph.
    pub fn traverse_with_deferral<F>(&mut self, mut visit: F)
    where
        F: FnMut(&NodeId, &AssetGraphNode) -> VisitControl<()>,
    {
        let mut visited: FxHashSet<NodeId> = FxHashSet::default();
        let mut stack: Vec<NodeId> = vec![self.root_id()];

        while let Some(id) = stack.pop() {
            if !visited.insert(id.clone()) {
                continue;
            }
            let Some(node) = self.node(&id) else {
                continue;
            };
            match visit(&id, node) {
                VisitControl::Stop => return,
                VisitControl::SkipChildren => {}
                VisitControl::Continue(()) => {
                    let children: Vec<NodeId> = self.children(&id).to_vec();
                    for child in children.into_iter().rev() {
                        if !visited.contains(&child) && self.should_visit_child(&id, &child) {
                            stack.push(child);
                        }
                    }
                }
            }
        }
    }

    /// Decide whether traversal should descend from a dependency into its
    /// asset group child, updating the group's memoized `deferred` state and
    /// the ancestor flags on a transition.
    ///
    /// Applies only to dependency → asset-group edges; any other pair is
    /// always visited. A group is deferred iff its side-effects flag is
    /// explicitly false and the dependency currently demands no symbols.
    /// Once a group has been decided not-deferred it stays visitable.
    pub fn should_visit_child(&mut self, node_id: &NodeId, child_id: &NodeId) -> bool {
        let (defer, previously_deferred) = match (self.node(node_id), self.node(child_id)) {
            (
                Some(AssetGraphNode::Dependency(dep)),
                Some(AssetGraphNode::AssetGroup(group)),
            ) => {
                if group.deferred == Some(false) {
                    return true;
                }
                let defer =
                    group.group.side_effects == Some(false) && dep.used_symbols.is_empty();
                (defer, group.deferred.unwrap_or(false))
            }
            _ => return true,
        };

        if let Some(AssetGraphNode::AssetGroup(group)) = self.node_mut(child_id) {
            group.deferred = Some(defer);
        }

        if !previously_deferred && defer {
            trace!(dependency = %node_id, group = %child_id, "deferring asset group");
            self.mark_parents_with_has_deferred(node_id);
        } else if previously_deferred && !defer {
            trace!(dependency = %node_id, group = %child_id, "asset group newly required");
            self.safe_to_incrementally_bundle = false;
            self.unmark_parents_with_has_deferred(node_id);
        }

        !defer
    }

    /// Set `has_deferred` on the dependency and every asset / asset-group
    /// ancestor, stopping each branch at the first node of any other kind.
    fn mark_parents_with_has_deferred(&mut self, dependency_id: &NodeId) {
        if let Some(AssetGraphNode::Dependency(dep)) = self.node_mut(dependency_id) {
            dep.has_deferred = true;
        }

        let mut visited: FxHashSet<NodeId> = FxHashSet::default();
        visited.insert(dependency_id.clone());
        let mut stack: Vec<NodeId> = self.parents(dependency_id).to_vec();

        while let Some(id) = stack.pop() {
            if !visited.insert(id.clone()) {
                continue;
            }
            let ascend = match self.node_mut(&id) {
                Some(AssetGraphNode::Asset(node)) => {
                    node.has_deferred = true;
                    true
                }
                Some(AssetGraphNode::AssetGroup(node)) => {
                    node.has_deferred = true;
                    true
                }
                _ => false,
            };
            if ascend {
                stack.extend(self.parents(&id).iter().cloned());
            }
        }
    }

    /// Clear `has_deferred` upwards after an un-defer transition.
    ///
    /// Asset ancestors recompute their flag from their direct children only
    /// (not the full subtree) and pass the result down the walk, so an
    /// asset-group ancestor keeps its flag while any sibling branch still
    /// defers. Direct-children-only rechecking is deliberate; in a diamond
    /// it can diverge from a full-subtree recomputation.
    fn unmark_parents_with_has_deferred(&mut self, dependency_id: &NodeId) {
        if let Some(AssetGraphNode::Dependency(dep)) = self.node_mut(dependency_id) {
            dep.has_deferred = false;
        }

        let mut visited: FxHashSet<NodeId> = FxHashSet::default();
        visited.insert(dependency_id.clone());
        // Context: whether the child we ascended from still requires
        // deferral of its parent group.
        let mut stack: Vec<(NodeId, bool)> = self
            .parents(dependency_id)
            .iter()
            .map(|p| (p.clone(), false))
            .collect();

        while let Some((id, child_has_deferred)) = stack.pop() {
            if !visited.insert(id.clone()) {
                continue;
            }
            match self.node(&id) {
                Some(AssetGraphNode::Asset(_)) => {
                    let still_deferred = self
                        .children(&id)
                        .iter()
                        .any(|child| self.node(child).is_some_and(AssetGraphNode::has_deferred));
                    if !still_deferred {
                        if let Some(AssetGraphNode::Asset(node)) = self.node_mut(&id) {
                            node.has_deferred = false;
                        }
                    }
                    let parents: Vec<_> = self.parents(&id).to_vec();
                    stack.extend(parents.into_iter().map(|p| (p, still_deferred)));
                }
                Some(AssetGraphNode::AssetGroup(_)) => {
                    if !child_has_deferred {
                        self.safe_to_incrementally_bundle = false;
                        if let Some(AssetGraphNode::AssetGroup(node)) = self.node_mut(&id) {
                            node.has_deferred = false;
                        }
                    }
                    let parents: Vec<_> = self.parents(&id).to_vec();
                    stack.extend(parents.into_iter().map(|p| (p, false)));
                }
                _ => {}
            }
        }
    }
}
