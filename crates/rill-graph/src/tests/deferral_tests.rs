//! Tests for deferral decisions and ancestor flag maintenance.

use super::{asset, dep, entry_graph, imports, transform};
use crate::{AssetGraph, AssetGraphNode, AssetGroup, NodeId, VisitControl};

fn has_deferred(graph: &AssetGraph, id: &NodeId) -> bool {
    graph.node(id).is_some_and(AssetGraphNode::has_deferred)
}

fn deferred(graph: &AssetGraph, id: &NodeId) -> Option<bool> {
    match graph.node(id) {
        Some(AssetGraphNode::AssetGroup(node)) => node.deferred,
        _ => None,
    }
}

fn demand(graph: &mut AssetGraph, dep_id: &NodeId, name: &str) {
    if let Some(AssetGraphNode::Dependency(node)) = graph.node_mut(dep_id) {
        node.used_symbols.insert(name.to_string());
    }
}

/// Entry graph transformed down to a main asset with one import of
/// `./utils.js`, resolved to a side-effect-free group. Returns the graph
/// and the ids of (main asset, utils dependency, utils group, index group).
fn deferral_fixture() -> (AssetGraph, NodeId, NodeId, NodeId, NodeId) {
    let (mut graph, _, entry_dep) = entry_graph();

    let utils_dep = dep("index->utils", "./utils.js").with_symbols(imports(&["a"]));
    let main = asset("index", "/app/index.js").with_dependencies(vec![utils_dep.clone()]);
    let index_group = transform(
        &mut graph,
        &entry_dep,
        AssetGroup::new("/app/index.js"),
        vec![main.clone()],
    );

    let utils_group = AssetGroup::new("/app/utils.js").without_side_effects();
    graph
        .resolve_dependency(&utils_dep.id, Some(utils_group.clone()), None)
        .unwrap();

    (
        graph,
        main.id,
        utils_dep.id,
        utils_group.content_key(),
        index_group,
    )
}

#[test]
fn side_effect_free_unused_group_is_deferred_with_ancestor_flags() {
    let (mut graph, main_id, utils_dep, utils_group, index_group) = deferral_fixture();

    assert_eq!(deferred(&graph, &utils_group), Some(true));
    assert!(!graph.should_visit_child(&utils_dep, &utils_group));
    assert!(has_deferred(&graph, &utils_dep));
    assert!(has_deferred(&graph, &main_id));
    assert!(has_deferred(&graph, &index_group));
}

#[test]
fn group_with_unknown_side_effects_is_never_deferred() {
    let (mut graph, _, entry_dep) = entry_graph();
    let group = AssetGroup::new("/app/index.js");
    graph.resolve_dependency(&entry_dep, Some(group.clone()), None).unwrap();

    let group_id = group.content_key();
    assert_eq!(deferred(&graph, &group_id), Some(false));
    assert!(graph.should_visit_child(&entry_dep, &group_id));
    assert!(!has_deferred(&graph, &entry_dep));
}

#[test]
fn new_symbol_demand_undefers_and_clears_ancestor_flags() {
    let (mut graph, main_id, utils_dep, utils_group, index_group) = deferral_fixture();
    assert_eq!(deferred(&graph, &utils_group), Some(true));

    // Demand flows into the main asset's import edge and re-evaluates the
    // deferred group on its way.
    graph.propagate_used_symbols(&main_id);

    assert_eq!(deferred(&graph, &utils_group), Some(false));
    assert!(graph.should_visit_child(&utils_dep, &utils_group));
    assert!(!has_deferred(&graph, &utils_dep));
    assert!(!has_deferred(&graph, &main_id));
    assert!(!has_deferred(&graph, &index_group));
    assert!(!graph.safe_to_incrementally_bundle());
}

#[test]
fn sibling_deferral_keeps_ancestor_flags_set() {
    let (mut graph, _, entry_dep) = entry_graph();

    let d1 = dep("index->a", "./a.js").with_symbols(imports(&["a"]));
    let d2 = dep("index->b", "./b.js").with_symbols(imports(&["b"]));
    let main =
        asset("index", "/app/index.js").with_dependencies(vec![d1.clone(), d2.clone()]);
    let index_group = transform(
        &mut graph,
        &entry_dep,
        AssetGroup::new("/app/index.js"),
        vec![main.clone()],
    );

    let g1 = AssetGroup::new("/app/a.js").without_side_effects();
    let g2 = AssetGroup::new("/app/b.js").without_side_effects();
    graph.resolve_dependency(&d1.id, Some(g1.clone()), None).unwrap();
    graph.resolve_dependency(&d2.id, Some(g2.clone()), None).unwrap();
    assert!(has_deferred(&graph, &main.id));

    // Un-defer only the first branch; the second still defers, so the
    // shared ancestors keep their flags.
    demand(&mut graph, &d1.id, "a");
    assert!(graph.should_visit_child(&d1.id, &g1.content_key()));

    assert!(!has_deferred(&graph, &d1.id));
    assert!(has_deferred(&graph, &d2.id));
    assert!(has_deferred(&graph, &main.id));
    assert!(has_deferred(&graph, &index_group));
}

/// Regression pin for the diamond case: an asset ancestor recomputes its
/// flag from direct children only, and a shared asset-group ancestor is
/// cleared through whichever branch reaches it first, even while a sibling
/// asset below it still defers.
#[test]
fn unmark_checks_direct_children_only_in_diamond() {
    let mut graph = AssetGraph::new();

    let shared_group = AssetGroup::new("/app/shared.js");
    let gp = shared_group.content_key();
    graph.add_node(gp.clone(), AssetGraphNode::asset_group(shared_group));

    let a1 = asset("a1", "/app/a1.js");
    let a2 = asset("a2", "/app/a2.js");
    graph.replace_children(
        &gp,
        vec![
            (a1.id.clone(), AssetGraphNode::asset(a1.clone())),
            (a2.id.clone(), AssetGraphNode::asset(a2.clone())),
        ],
    );

    // Both assets share one import declaration; a1 has a second one.
    let shared_dep = dep("shared", "./leaf.js");
    let extra_dep = dep("a1-extra", "./extra.js");
    graph.replace_children(
        &a1.id,
        vec![
            (shared_dep.id.clone(), AssetGraphNode::dependency(shared_dep.clone())),
            (extra_dep.id.clone(), AssetGraphNode::dependency(extra_dep.clone())),
        ],
    );
    graph.replace_children(
        &a2.id,
        vec![(shared_dep.id.clone(), AssetGraphNode::dependency(shared_dep.clone()))],
    );

    let leaf = AssetGroup::new("/app/leaf.js").without_side_effects();
    let extra = AssetGroup::new("/app/extra.js").without_side_effects();
    graph.resolve_dependency(&shared_dep.id, Some(leaf.clone()), None).unwrap();
    graph.resolve_dependency(&extra_dep.id, Some(extra.clone()), None).unwrap();
    assert!(has_deferred(&graph, &a1.id));
    assert!(has_deferred(&graph, &a2.id));
    assert!(has_deferred(&graph, &gp));

    demand(&mut graph, &shared_dep.id, "x");
    assert!(graph.should_visit_child(&shared_dep.id, &leaf.content_key()));

    // a1 still defers through its extra import...
    assert!(has_deferred(&graph, &a1.id));
    assert!(!has_deferred(&graph, &a2.id));
    // ...yet the shared group ancestor was cleared through the a2 branch.
    assert!(!has_deferred(&graph, &gp));
}

#[test]
fn traverse_assets_prunes_deferred_subtrees_until_required() {
    let (mut graph, main_id, utils_dep, utils_group_id, _) = deferral_fixture();

    // The group was transformed before deferral kicked in, so the utils
    // asset is present but hidden behind the deferred group.
    let utils_group = AssetGroup::new("/app/utils.js").without_side_effects();
    let utils =
        asset("utils", "/app/utils.js").with_symbols(super::exports(&[("a", "a")]));
    graph.resolve_asset_group(&utils_group, vec![utils.clone()], None).unwrap();

    let mut seen = Vec::new();
    graph.traverse_assets(|id, _| seen.push(id.clone()));
    assert_eq!(seen, vec![main_id.clone()]);

    demand(&mut graph, &utils_dep, "a");
    assert!(graph.should_visit_child(&utils_dep, &utils_group_id));

    let mut seen = Vec::new();
    graph.traverse_assets(|id, _| seen.push(id.clone()));
    assert_eq!(seen, vec![main_id, utils.id]);
}

#[test]
fn traverse_with_deferral_reevaluates_edges_while_walking() {
    let (mut graph, _, utils_dep, utils_group, _) = deferral_fixture();
    assert_eq!(deferred(&graph, &utils_group), Some(true));

    demand(&mut graph, &utils_dep, "a");

    let mut visited_group = false;
    graph.traverse_with_deferral(|id, _| {
        if *id == utils_group {
            visited_group = true;
        }
        VisitControl::Continue(())
    });

    assert!(visited_group);
    assert_eq!(deferred(&graph, &utils_group), Some(false));
    assert!(!has_deferred(&graph, &utils_dep));
}
