//! # rill-graph
//!
//! Incremental asset graph for the rill bundler.
//!
//! This crate models how entry points resolve to files, targets, import
//! declarations, asset groups, and compiled assets, as a directed graph
//! that grows and shrinks while asynchronous resolution and transform steps
//! complete out of order. It is pure data structure: resolution, transform,
//! bundling, and scheduling all live outside and drive it through mutation
//! calls and read-only traversals.
//!
//! ## Overview
//!
//! - **Generic store** ([`Graph`]): id-keyed nodes, explicit forward and
//!   reverse adjacency, a diff-and-replace child mutation primitive with
//!   cascading removal, and cycle-safe traversal (circular imports are
//!   legal).
//! - **Resolution state machine** ([`AssetGraph`]): five idempotent
//!   mutators advancing an entry specifier to a compiled module graph, each
//!   localizing its edit so unchanged subtrees are structurally shared.
//! - **Used-symbol propagation**: per asset, the minimal set of exports
//!   actually consumed transitively, enabling dead-code elimination.
//! - **Deferral**: side-effect-free groups nothing demands are skipped by
//!   traversal, with ancestor `has_deferred` flags maintained incrementally.
//! - **Hash cache**: memoized whole-graph content digest for build caching,
//!   invalidated by structural edits.
//!
//! ## Quick start
//!
//! ```rust
//! use rill_graph::{AssetGraph, Entry, Environment, Target};
//!
//! # fn main() -> rill_graph::Result<()> {
//! let mut graph = AssetGraph::new();
//! graph.set_entries(["./index.js".to_string()]);
//!
//! let entry = Entry::new("/app/index.js", "/app");
//! graph.resolve_entry("./index.js", vec![entry.clone()], None)?;
//! graph.resolve_targets(&entry, vec![Target::new("default", Environment::browser())], None)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency
//!
//! The graph holds no internal locks. The external scheduler serializes all
//! mutating calls against one instance; read-only operations may interleave
//! with each other but never with an in-flight mutation.

pub mod asset;
pub mod dependency;
pub mod entry;
pub mod graph;
pub mod node;
pub mod node_id;

mod asset_graph;

pub use asset::{AssetGroup, AssetRecord, ExportSymbol};
pub use asset_graph::{AssetGraph, NodeRemovedObserver};
pub use dependency::{DependencyDescriptor, ImportSymbol, Priority, SpecifierType, WILDCARD};
pub use entry::{Entry, Environment, Target};
pub use graph::{Graph, VisitControl};
pub use node::{
    AssetGraphNode, AssetGroupNode, AssetNode, DependencyNode, EntryFileNode, EntrySpecifierNode,
};
pub use node_id::NodeId;

/// Error types for asset graph operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A strict resolver named a node that is not in the graph. This means
    /// the upstream scheduler violated its ordering invariant; it is not a
    /// recoverable condition.
    #[error("node not found in asset graph: {0}")]
    MissingNode(NodeId),

    /// The graph has no root node.
    #[error("asset graph has no root node")]
    MissingRoot,

    /// Snapshot or export serialization failed.
    #[error("{0}")]
    Serialization(String),
}

/// Result type alias for asset graph operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests;
