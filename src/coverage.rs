//! Judgment coverage per canonical item.
//!
//! Coverage counts how many resolved judgments touch a canonical node. Each
//! counted judgment adds one to the subject's node and one to the object's
//! node when they differ, so a SAME judgment inside one class counts once.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::item::ItemId;
use crate::judgment::{JudgmentSet, Relation};
use crate::merge::EquivalenceClasses;

/// Which relations count toward coverage.
///
/// WORSE and BETTER always count; INCOMPARABLE, IGNORE and pending records
/// never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoveragePolicy {
    #[serde(default = "default_count_same")]
    pub count_same: bool,
}

fn default_count_same() -> bool {
    true
}

impl Default for CoveragePolicy {
    fn default() -> Self {
        Self {
            count_same: default_count_same(),
        }
    }
}

impl CoveragePolicy {
    pub fn counts(&self, relation: Option<Relation>) -> bool {
        match relation {
            Some(Relation::Worse | Relation::Better) => true,
            Some(Relation::Same) => self.count_same,
            Some(Relation::Incomparable | Relation::Ignore) | None => false,
        }
    }
}

/// Coverage count for every canonical node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Coverage {
    counts: BTreeMap<ItemId, usize>,
}

impl Coverage {
    pub fn compute(
        judgments: &JudgmentSet,
        classes: &EquivalenceClasses,
        policy: CoveragePolicy,
    ) -> Self {
        let mut counts: BTreeMap<ItemId, usize> = classes
            .canonical_nodes()
            .into_iter()
            .map(|node| (node, 0))
            .collect();

        for judgment in judgments.iter().filter(|j| policy.counts(j.relation)) {
            let subject = classes.canonical(judgment.subject);
            let object = classes.canonical(judgment.object);
            *counts.entry(subject).or_default() += 1;
            if object != subject {
                *counts.entry(object).or_default() += 1;
            }
        }

        Self { counts }
    }

    /// Coverage of a canonical node (0 for unknown nodes).
    pub fn count(&self, node: ItemId) -> usize {
        self.counts.get(&node).copied().unwrap_or(0)
    }

    /// All nodes sorted by `(count, node)`.
    pub fn ascending(&self) -> Vec<(ItemId, usize)> {
        let mut sorted: Vec<(ItemId, usize)> =
            self.counts.iter().map(|(&node, &count)| (node, count)).collect();
        sorted.sort_by_key(|&(node, count)| (count, node));
        sorted
    }

    /// The `n` least covered nodes.
    pub fn lowest(&self, n: usize) -> Vec<ItemId> {
        self.ascending()
            .into_iter()
            .take(n)
            .map(|(node, _)| node)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemId, usize)> + '_ {
        self.counts.iter().map(|(&node, &count)| (node, count))
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
