//! Loss-less snapshot/restore of graph state for cross-run incremental
//! builds, plus JSON and DOT exports for inspection.
//!
//! The removal observer is a closure and does not serialize; restore it
//! with [`AssetGraph::from_bytes_with_observer`].

use serde::{Deserialize, Serialize};

use super::{AssetGraph, NodeRemovedObserver};
use crate::graph::Graph;
use crate::node::AssetGraphNode;
use crate::{Error, Result};

const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    graph: &'a Graph<AssetGraphNode>,
    hash: Option<&'a str>,
    safe_to_incrementally_bundle: bool,
}

#[derive(Deserialize)]
struct Snapshot {
    version: u32,
    graph: Graph<AssetGraphNode>,
    hash: Option<String>,
    safe_to_incrementally_bundle: bool,
}

impl AssetGraph {
    /// Serialize the full graph state, including node payloads, edges, and
    /// the cached hash, to a versioned binary snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let snapshot = SnapshotRef {
            version: FORMAT_VERSION,
            graph: &self.graph,
            hash: self.hash.as_deref(),
            safe_to_incrementally_bundle: self.safe_to_incrementally_bundle,
        };
        bincode::serde::encode_to_vec(&snapshot, bincode::config::standard())
            .map_err(|e| Error::Serialization(format!("failed to encode snapshot: {e}")))
    }

    /// Restore a graph from a snapshot produced by [`AssetGraph::to_bytes`].
    ///
    /// # Errors
    ///
    /// Returns an error if decoding fails or the format version does not
    /// match.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let (snapshot, _): (Snapshot, _) =
            bincode::serde::decode_from_slice(bytes, bincode::config::standard())
                .map_err(|e| Error::Serialization(format!("failed to decode snapshot: {e}")))?;

        if snapshot.version != FORMAT_VERSION {
            return Err(Error::Serialization(format!(
                "incompatible snapshot version: expected {FORMAT_VERSION}, got {}",
                snapshot.version
            )));
        }
        if snapshot.graph.root().is_none() {
            return Err(Error::MissingRoot);
        }

        Ok(Self {
            graph: snapshot.graph,
            hash: snapshot.hash,
            safe_to_incrementally_bundle: snapshot.safe_to_incrementally_bundle,
            on_node_removed: None,
        })
    }

    /// Restore a graph from a snapshot and re-attach a removal observer.
    pub fn from_bytes_with_observer(
        bytes: &[u8],
        observer: NodeRemovedObserver,
    ) -> Result<Self> {
        let mut graph = Self::from_bytes(bytes)?;
        graph.on_node_removed = Some(observer);
        Ok(graph)
    }

    /// Export the graph to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        #[derive(Serialize)]
        struct GraphJson<'a> {
            graph: &'a Graph<AssetGraphNode>,
            hash: Option<&'a str>,
        }

        serde_json::to_string_pretty(&GraphJson {
            graph: &self.graph,
            hash: self.hash.as_deref(),
        })
        .map_err(|e| Error::Serialization(format!("failed to serialize graph: {e}")))
    }

    /// Export the graph as DOT format for visualization.
    pub fn to_dot(&self) -> String {
        fn escape_label(label: &str) -> String {
            label.replace('"', "\\\"")
        }

        let mut output = String::from("digraph AssetGraph {\n");
        let mut ids: Vec<_> = self.graph.node_ids().collect();
        ids.sort();

        for id in &ids {
            if let Some(node) = self.graph.node(id) {
                output.push_str("    \"");
                output.push_str(&escape_label(id.as_str()));
                output.push_str("\" [label=\"");
                output.push_str(node.kind());
                output.push_str("\"];\n");
            }
        }

        for id in &ids {
            for child in self.graph.children(id) {
                output.push_str("    \"");
                output.push_str(&escape_label(id.as_str()));
                output.push_str("\" -> \"");
                output.push_str(&escape_label(child.as_str()));
                output.push_str("\";\n");
            }
        }

        output.push_str("}\n");
        output
    }
}
