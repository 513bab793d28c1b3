//! Cycle-safe traversal over the generic graph.
//!
//! Module graphs legally contain cycles (circular imports), so every walk
//! here carries its own visited-set guard and visits each reachable node at
//! most once. Descendant walks are pre-order depth-first in edge insertion
//! order; ancestor walks mirror them over the reverse adjacency lists.

use rustc_hash::FxHashSet;

use super::Graph;
use crate::node_id::NodeId;

/// Per-visit control signal returned by traversal visitors.
///
/// `Continue` carries the context value handed to the children of the
/// current node, letting visitors accumulate state down the walk.
pub enum VisitControl<C> {
    Continue(C),
    /// Prune the current subtree; siblings are still visited.
    SkipChildren,
    /// Abort the whole traversal.
    Stop,
}

impl<N> Graph<N> {
    /// Pre-order depth-first walk over descendant edges starting at `start`.
    pub fn traverse<C, F>(&self, start: &NodeId, initial: C, mut visit: F)
    where
        C: Clone,
        F: FnMut(&NodeId, &N, &C) -> VisitControl<C>,
    {
        self.walk(start, initial, &mut visit, |graph, id| graph.children(id));
    }

    /// Walk over incoming edges, visiting ancestors of `start`.
    pub fn traverse_ancestors<C, F>(&self, start: &NodeId, initial: C, mut visit: F)
    where
        C: Clone,
        F: FnMut(&NodeId, &N, &C) -> VisitControl<C>,
    {
        self.walk(start, initial, &mut visit, |graph, id| graph.parents(id));
    }

    /// Collect every ancestor of `start` matching `predicate`.
    ///
    /// The walk continues past matches, so transitively-matching ancestors
    /// are all returned, not just the nearest per branch.
    pub fn find_ancestors<F>(&self, start: &NodeId, predicate: F) -> Vec<NodeId>
    where
        F: Fn(&NodeId, &N) -> bool,
    {
        let mut found = Vec::new();
        self.traverse_ancestors(start, (), |id, node, _| {
            if id != start && predicate(id, node) {
                found.push(id.clone());
            }
            VisitControl::Continue(())
        });
        found
    }

    /// Like [`Graph::traverse`], but each node is first passed through
    /// `map`. Nodes mapping to `None` are not handed to the visitor, yet
    /// their descendants are still walked under the inherited context.
    pub fn filtered_traverse<T, C, M, F>(&self, start: &NodeId, initial: C, map: M, mut visit: F)
    where
        C: Clone,
        M: Fn(&NodeId, &N) -> Option<T>,
        F: FnMut(&NodeId, T, &C) -> VisitControl<C>,
    {
        self.walk(
            start,
            initial,
            &mut |id, node, ctx| match map(id, node) {
                Some(mapped) => visit(id, mapped, ctx),
                None => VisitControl::Continue(ctx.clone()),
            },
            |graph, id| graph.children(id),
        );
    }

    fn walk<C, F, E>(&self, start: &NodeId, initial: C, visit: &mut F, edges: E)
    where
        C: Clone,
        F: FnMut(&NodeId, &N, &C) -> VisitControl<C>,
        E: for<'a> Fn(&'a Self, &NodeId) -> &'a [NodeId],
    {
        let mut visited: FxHashSet<NodeId> = FxHashSet::default();
        let mut stack: Vec<(NodeId, C)> = vec![(start.clone(), initial)];

        while let Some((id, ctx)) = stack.pop() {
            if !visited.insert(id.clone()) {
                continue;
            }
            let Some(node) = self.node(&id) else {
                continue;
            };
            match visit(&id, node, &ctx) {
                VisitControl::Stop => return,
                VisitControl::SkipChildren => {}
                VisitControl::Continue(child_ctx) => {
                    // Reversed push keeps pop order equal to edge order.
                    for next in edges(self, &id).iter().rev() {
                        if !visited.contains(next) {
                            stack.push((next.clone(), child_ctx.clone()));
                        }
                    }
                }
            }
        }
    }
}
