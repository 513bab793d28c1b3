//! Unit tests for rill-graph.
//!
//! Fast, deterministic tests over graph primitives, the resolution state
//! machine, symbol propagation, deferral, hashing, and snapshots. For
//! randomized invariant checking see property_tests.rs (requires the
//! proptest feature).

mod deferral_tests;
mod symbol_tests;

use crate::{
    AssetGraph, AssetGroup, AssetRecord, DependencyDescriptor, Entry, Environment, ExportSymbol,
    ImportSymbol, NodeId, Target,
};

/// Graph with `./index.js` resolved down to its entry dependency.
/// Returns the graph, the entry, and the entry dependency's node id.
pub(crate) fn entry_graph() -> (AssetGraph, Entry, NodeId) {
    let mut graph = AssetGraph::new();
    graph.set_entries(["./index.js".to_string()]);

    let entry = Entry::new("/app/index.js", "/app");
    graph
        .resolve_entry("./index.js", vec![entry.clone()], Some("req-entry".into()))
        .expect("entry specifier must exist");
    graph
        .resolve_targets(
            &entry,
            vec![Target::new("default", Environment::browser())],
            Some("req-targets".into()),
        )
        .expect("entry file must exist");

    let entry_dep = graph.children(&entry.content_key())[0].clone();
    (graph, entry, entry_dep)
}

pub(crate) fn dep(id: &str, specifier: &str) -> DependencyDescriptor {
    DependencyDescriptor::new(NodeId::new(id), specifier)
}

pub(crate) fn asset(id: &str, file_path: &str) -> AssetRecord {
    AssetRecord::new(NodeId::new(id), file_path).with_output_hash(format!("hash-{id}"))
}

pub(crate) fn exports(pairs: &[(&str, &str)]) -> Vec<ExportSymbol> {
    pairs
        .iter()
        .map(|(exported, local)| ExportSymbol::new(*exported, *local))
        .collect()
}

pub(crate) fn imports(names: &[&str]) -> Vec<ImportSymbol> {
    names
        .iter()
        .map(|name| ImportSymbol::new(*name, *name))
        .collect()
}

/// Resolve `dependency_id` to a group and transform it into `assets`.
pub(crate) fn transform(
    graph: &mut AssetGraph,
    dependency_id: &NodeId,
    group: AssetGroup,
    assets: Vec<AssetRecord>,
) -> NodeId {
    graph
        .resolve_dependency(dependency_id, Some(group.clone()), None)
        .expect("resolve_dependency is tolerant");
    graph
        .resolve_asset_group(&group, assets, None)
        .expect("resolve_asset_group is tolerant");
    group.content_key()
}
