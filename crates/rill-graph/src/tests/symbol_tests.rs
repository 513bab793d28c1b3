//! Tests for used-symbol propagation.

use super::{asset, dep, exports, imports};
use crate::{AssetGraph, AssetGraphNode, ImportSymbol, NodeId};

fn add_dependency(graph: &mut AssetGraph, id: &str) -> NodeId {
    let node_id = NodeId::new(id);
    graph.add_node(node_id.clone(), AssetGraphNode::dependency(dep(id, "./mod.js")));
    node_id
}

fn demand(graph: &mut AssetGraph, dep_id: &NodeId, names: &[&str]) {
    if let Some(AssetGraphNode::Dependency(node)) = graph.node_mut(dep_id) {
        for name in names {
            node.used_symbols.insert((*name).to_string());
        }
    }
}

fn used_symbols(graph: &AssetGraph, id: &NodeId) -> Vec<String> {
    let mut names: Vec<String> = match graph.node(id) {
        Some(AssetGraphNode::Asset(node)) => node.used_symbols.iter().cloned().collect(),
        Some(AssetGraphNode::Dependency(node)) => node.used_symbols.iter().cloned().collect(),
        _ => Vec::new(),
    };
    names.sort();
    names
}

#[test]
fn demanded_direct_exports_are_used_and_the_rest_excluded() {
    let mut graph = AssetGraph::new();
    let du = add_dependency(&mut graph, "du");
    let utils = asset("utils", "/app/utils.js").with_symbols(exports(&[("a", "a"), ("b", "b")]));
    graph.replace_children(&du, vec![(utils.id.clone(), AssetGraphNode::asset(utils.clone()))]);
    demand(&mut graph, &du, &["a"]);

    graph.propagate_used_symbols(&utils.id);

    assert_eq!(used_symbols(&graph, &utils.id), vec!["a"]);
}

#[test]
fn wildcard_demand_replaces_the_used_set_and_routes_namespace_names() {
    let mut graph = AssetGraph::new();
    let d1 = add_dependency(&mut graph, "d1");
    let d2 = add_dependency(&mut graph, "d2");
    let barrel = asset("barrel", "/app/barrel.js").with_symbols(exports(&[("a", "a"), ("b", "b")]));
    graph.replace_children(&d1, vec![(barrel.id.clone(), AssetGraphNode::asset(barrel.clone()))]);
    graph.replace_children(&d2, vec![(barrel.id.clone(), AssetGraphNode::asset(barrel.clone()))]);

    // `c` is not declared by the barrel, so it must flow through the
    // namespace re-export below.
    demand(&mut graph, &d1, &["a", "c"]);
    demand(&mut graph, &d2, &["*"]);

    let star = dep("barrel->inner", "./inner.js")
        .with_symbols(vec![ImportSymbol::new("*", "*")]);
    let star_id = star.id.clone();
    graph.replace_children(
        &barrel.id,
        vec![(star_id.clone(), AssetGraphNode::dependency(star))],
    );

    graph.propagate_used_symbols(&barrel.id);

    assert_eq!(used_symbols(&graph, &barrel.id), vec!["*"]);
    assert_eq!(used_symbols(&graph, &star_id), vec!["c"]);
}

#[test]
fn satisfied_weak_binding_forwards_demand_and_uncredits_the_reexport() {
    let mut graph = AssetGraph::new();
    let du = add_dependency(&mut graph, "du");
    let facade =
        asset("facade", "/app/facade.js").with_symbols(exports(&[("x", "localX")]));
    graph.replace_children(&du, vec![(facade.id.clone(), AssetGraphNode::asset(facade.clone()))]);
    demand(&mut graph, &du, &["x"]);

    let weak = dep("facade->impl", "./impl.js")
        .with_symbols(vec![ImportSymbol::weak("x", "localX")]);
    let weak_id = weak.id.clone();
    graph.replace_children(
        &facade.id,
        vec![(weak_id.clone(), AssetGraphNode::dependency(weak))],
    );

    graph.propagate_used_symbols(&facade.id);

    assert_eq!(used_symbols(&graph, &weak_id), vec!["x"]);
    // The demand was credited to the weak binding, not kept on the facade.
    assert!(used_symbols(&graph, &facade.id).is_empty());
}

#[test]
fn wildcard_demand_satisfies_weak_bindings_without_uncrediting() {
    let mut graph = AssetGraph::new();
    let du = add_dependency(&mut graph, "du");
    let facade =
        asset("facade", "/app/facade.js").with_symbols(exports(&[("x", "localX")]));
    graph.replace_children(&du, vec![(facade.id.clone(), AssetGraphNode::asset(facade.clone()))]);
    // A library entry edge: every export counts as consumed.
    demand(&mut graph, &du, &["*"]);

    let weak = dep("facade->impl", "./impl.js")
        .with_symbols(vec![ImportSymbol::weak("x", "localX")]);
    let weak_id = weak.id.clone();
    graph.replace_children(
        &facade.id,
        vec![(weak_id.clone(), AssetGraphNode::dependency(weak))],
    );

    graph.propagate_used_symbols(&facade.id);

    // The wildcard satisfies the re-export, and stays on the facade since
    // crediting removes named demand only.
    assert_eq!(used_symbols(&graph, &weak_id), vec!["x"]);
    assert_eq!(used_symbols(&graph, &facade.id), vec!["*"]);
}

#[test]
fn unsatisfied_weak_binding_forwards_nothing() {
    let mut graph = AssetGraph::new();
    let du = add_dependency(&mut graph, "du");
    let facade =
        asset("facade", "/app/facade.js").with_symbols(exports(&[("x", "localX")]));
    graph.replace_children(&du, vec![(facade.id.clone(), AssetGraphNode::asset(facade.clone()))]);

    let weak = dep("facade->impl", "./impl.js")
        .with_symbols(vec![ImportSymbol::weak("x", "localX")]);
    let weak_id = weak.id.clone();
    graph.replace_children(
        &facade.id,
        vec![(weak_id.clone(), AssetGraphNode::dependency(weak))],
    );

    graph.propagate_used_symbols(&facade.id);

    assert!(used_symbols(&graph, &weak_id).is_empty());
}

#[test]
fn missing_export_table_forwards_weak_bindings_unconditionally() {
    let mut graph = AssetGraph::new();
    let du = add_dependency(&mut graph, "du");
    let opaque = asset("opaque", "/app/opaque.js"); // no symbol table
    graph.replace_children(&du, vec![(opaque.id.clone(), AssetGraphNode::asset(opaque.clone()))]);

    let weak = dep("opaque->impl", "./impl.js")
        .with_symbols(vec![ImportSymbol::weak("y", "localY")]);
    let weak_id = weak.id.clone();
    graph.replace_children(
        &opaque.id,
        vec![(weak_id.clone(), AssetGraphNode::dependency(weak))],
    );

    graph.propagate_used_symbols(&opaque.id);

    assert_eq!(used_symbols(&graph, &weak_id), vec!["y"]);
}

#[test]
fn asset_used_set_is_replaced_wholesale() {
    let mut graph = AssetGraph::new();
    let du = add_dependency(&mut graph, "du");
    let utils = asset("utils", "/app/utils.js").with_symbols(exports(&[("a", "a")]));
    graph.replace_children(&du, vec![(utils.id.clone(), AssetGraphNode::asset(utils.clone()))]);

    if let Some(AssetGraphNode::Asset(node)) = graph.node_mut(&utils.id) {
        node.used_symbols.insert("stale".into());
    }

    graph.propagate_used_symbols(&utils.id);

    assert!(used_symbols(&graph, &utils.id).is_empty());
}

#[test]
fn dependency_demand_only_grows_across_passes() {
    let mut graph = AssetGraph::new();
    let du = add_dependency(&mut graph, "du");
    let main = asset("main", "/app/main.js").with_symbols(exports(&[("a", "a")]));
    graph.replace_children(&du, vec![(main.id.clone(), AssetGraphNode::asset(main.clone()))]);

    let strong = dep("main->next", "./next.js").with_symbols(imports(&["x"]));
    let strong_id = strong.id.clone();
    graph.replace_children(
        &main.id,
        vec![(strong_id.clone(), AssetGraphNode::dependency(strong))],
    );
    demand(&mut graph, &strong_id, &["z"]);

    graph.propagate_used_symbols(&main.id);

    assert_eq!(used_symbols(&graph, &strong_id), vec!["x", "z"]);
}
