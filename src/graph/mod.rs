//! Preference graph over canonical items.
//!
//! An edge `u → v` means "v is preferred over u". Only WORSE and BETTER
//! judgments produce edges, translated through the equivalence classes so
//! that merged items share one node. The builder keeps the raw edge multiset:
//! repeated edges survive and [`PreferenceGraph::dedup`] is a separate step.
//!
//! - [`analytics`]: petgraph-backed diagnostics (components, preference cycles)

pub mod analytics;

use std::collections::{BTreeMap, HashSet};

use crate::item::ItemId;
use crate::judgment::{JudgmentSet, Relation};
use crate::merge::EquivalenceClasses;

/// Adjacency list: canonical node → nodes it is worse than, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferenceGraph {
    adjacency: BTreeMap<ItemId, Vec<ItemId>>,
    dropped_self_edges: usize,
}

impl PreferenceGraph {
    /// Build the graph from consolidated judgments.
    ///
    /// Every canonical node of `classes` is present, edges or not.
    pub fn build(judgments: &JudgmentSet, classes: &EquivalenceClasses) -> Self {
        let mut graph = Self {
            adjacency: classes
                .canonical_nodes()
                .into_iter()
                .map(|node| (node, Vec::new()))
                .collect(),
            dropped_self_edges: 0,
        };

        for judgment in judgments.in_log_order() {
            let (worse, better) = match judgment.relation {
                Some(Relation::Worse) => (judgment.subject, judgment.object),
                Some(Relation::Better) => (judgment.object, judgment.subject),
                _ => continue,
            };
            graph.add_edge(classes.canonical(worse), classes.canonical(better));
        }

        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            dropped = graph.dropped_self_edges,
            "built preference graph"
        );
        graph
    }

    fn add_edge(&mut self, from: ItemId, to: ItemId) {
        if from == to {
            self.dropped_self_edges += 1;
            return;
        }
        self.adjacency.entry(to).or_default();
        self.adjacency.entry(from).or_default().push(to);
    }

    /// Copy of the graph with repeated edges removed (first occurrence kept).
    pub fn dedup(&self) -> Self {
        let adjacency = self
            .adjacency
            .iter()
            .map(|(&from, tos)| {
                let mut seen = HashSet::new();
                let unique: Vec<ItemId> = tos.iter().copied().filter(|to| seen.insert(*to)).collect();
                (from, unique)
            })
            .collect();
        Self {
            adjacency,
            dropped_self_edges: self.dropped_self_edges,
        }
    }

    /// Nodes `node` is worse than, in insertion order.
    pub fn worse_than(&self, node: ItemId) -> &[ItemId] {
        self.adjacency.get(&node).map(Vec::as_slice).unwrap_or_default()
    }

    /// All nodes, ascending.
    pub fn nodes(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.adjacency.keys().copied()
    }

    /// Edges in node order, then insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (ItemId, ItemId)> + '_ {
        self.adjacency
            .iter()
            .flat_map(|(&from, tos)| tos.iter().map(move |&to| (from, to)))
    }

    /// Edges sorted by `(from, to)`; duplicates stay adjacent.
    pub fn sorted_edges(&self) -> Vec<(ItemId, ItemId)> {
        let mut edges: Vec<_> = self.edges().collect();
        edges.sort();
        edges
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }

    /// WORSE/BETTER judgments that collapsed into a single class.
    pub fn dropped_self_edges(&self) -> usize {
        self.dropped_self_edges
    }
}
