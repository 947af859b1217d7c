//! Graph diagnostics: connectivity and contradictory preference loops.
//!
//! Nothing here changes the preference graph. Cycles are reported so the
//! rater can revisit them; they are never resolved automatically.

use std::collections::HashMap;

use petgraph::algo::{connected_components, tarjan_scc};
use petgraph::graph::{DiGraph, NodeIndex};

use crate::item::ItemId;

use super::PreferenceGraph;

/// Convert to a petgraph `DiGraph`, one petgraph node per canonical node.
///
/// Returns the graph and the `ItemId → NodeIndex` map.
pub fn to_petgraph(graph: &PreferenceGraph) -> (DiGraph<ItemId, ()>, HashMap<ItemId, NodeIndex>) {
    let mut pg = DiGraph::with_capacity(graph.node_count(), graph.edge_count());
    let index: HashMap<ItemId, NodeIndex> = graph
        .nodes()
        .map(|node| (node, pg.add_node(node)))
        .collect();
    for (from, to) in graph.edges() {
        pg.add_edge(index[&from], index[&to], ());
    }
    (pg, index)
}

// ---------------------------------------------------------------------------
// Connectivity
// ---------------------------------------------------------------------------

/// Number of weakly connected components.
///
/// Items in different components have no comparison path between them at all.
pub fn component_count(graph: &PreferenceGraph) -> usize {
    let (pg, _) = to_petgraph(graph);
    connected_components(&pg)
}

/// Canonical nodes with no edges in either direction.
pub fn isolated_nodes(graph: &PreferenceGraph) -> Vec<ItemId> {
    let mut touched = std::collections::HashSet::new();
    for (from, to) in graph.edges() {
        touched.insert(from);
        touched.insert(to);
    }
    graph.nodes().filter(|node| !touched.contains(node)).collect()
}

// ---------------------------------------------------------------------------
// Preference cycles
// ---------------------------------------------------------------------------

/// A set of canonical nodes that are each (transitively) worse than each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceCycle {
    /// Members, ascending.
    pub members: Vec<ItemId>,
}

/// Strongly connected components with more than one member.
///
/// Sorted by size desc, then by smallest member.
pub fn cycles(graph: &PreferenceGraph) -> Vec<PreferenceCycle> {
    let (pg, _) = to_petgraph(graph);

    let mut cycles: Vec<PreferenceCycle> = tarjan_scc(&pg)
        .into_iter()
        .filter(|component| component.len() > 1)
        .map(|component| {
            let mut members: Vec<ItemId> = component.iter().map(|&idx| pg[idx]).collect();
            members.sort();
            PreferenceCycle { members }
        })
        .collect();

    cycles.sort_by(|a, b| {
        b.members
            .len()
            .cmp(&a.members.len())
            .then_with(|| a.members.cmp(&b.members))
    });
    cycles
}
