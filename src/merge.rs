//! Equivalence classes of items judged SAME.
//!
//! A plain union-find: parent pointers without path compression or rank.
//! `find` never mutates, so it is idempotent and can be called through `&self`.
//! At the scale of a personal ratings export (hundreds of items) the chains
//! stay short.

use std::collections::BTreeMap;

use crate::item::ItemId;
use crate::judgment::{JudgmentSet, Relation};

/// Union-find over item ids.
#[derive(Debug, Clone, Default)]
pub struct EquivalenceClasses {
    parents: BTreeMap<ItemId, ItemId>,
}

impl EquivalenceClasses {
    /// Every id starts in its own class.
    pub fn new(ids: impl IntoIterator<Item = ItemId>) -> Self {
        Self {
            parents: ids.into_iter().map(|id| (id, id)).collect(),
        }
    }

    /// Build classes from all SAME judgments, merged in log order.
    pub fn from_judgments(ids: impl IntoIterator<Item = ItemId>, judgments: &JudgmentSet) -> Self {
        let mut classes = Self::new(ids);
        for judgment in judgments.in_log_order() {
            if judgment.relation == Some(Relation::Same) {
                classes.merge(judgment.subject, judgment.object);
            }
        }
        classes
    }

    /// Attach `j`'s root under `i`'s root.
    pub fn merge(&mut self, i: ItemId, j: ItemId) {
        let (Some(root_i), Some(root_j)) = (self.find(i), self.find(j)) else {
            tracing::warn!(%i, %j, "merge of unknown item ignored");
            return;
        };
        if root_i != root_j {
            self.parents.insert(root_j, root_i);
        }
    }

    /// Root of `id`'s class, or `None` for an unknown id.
    pub fn find(&self, id: ItemId) -> Option<ItemId> {
        let mut current = id;
        loop {
            let parent = *self.parents.get(&current)?;
            if parent == current {
                return Some(current);
            }
            current = parent;
        }
    }

    /// Canonical node for `id`; unknown ids stand for themselves.
    pub fn canonical(&self, id: ItemId) -> ItemId {
        self.find(id).unwrap_or(id)
    }

    pub fn same_class(&self, a: ItemId, b: ItemId) -> bool {
        matches!((self.find(a), self.find(b)), (Some(x), Some(y)) if x == y)
    }

    /// Partition of all known items keyed by root, members ascending.
    pub fn groups(&self) -> BTreeMap<ItemId, Vec<ItemId>> {
        let mut groups: BTreeMap<ItemId, Vec<ItemId>> = BTreeMap::new();
        for &id in self.parents.keys() {
            groups.entry(self.canonical(id)).or_default().push(id);
        }
        groups
    }

    /// Only the classes that actually merged something.
    pub fn merged_groups(&self) -> BTreeMap<ItemId, Vec<ItemId>> {
        self.groups()
            .into_iter()
            .filter(|(_, members)| members.len() > 1)
            .collect()
    }

    /// All roots, ascending.
    pub fn canonical_nodes(&self) -> Vec<ItemId> {
        self.parents
            .iter()
            .filter(|(id, parent)| id == parent)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::judgment::Judgment;

    fn ids(n: u32) -> Vec<ItemId> {
        (0..n).map(ItemId::new).collect()
    }

    fn id(n: u32) -> ItemId {
        ItemId::new(n)
    }

    fn membership(classes: &EquivalenceClasses) -> BTreeSet<Vec<ItemId>> {
        classes.groups().into_values().collect()
    }

    #[test]
    fn find_is_idempotent() {
        let mut classes = EquivalenceClasses::new(ids(4));
        classes.merge(id(0), id(1));
        classes.merge(id(2), id(1));
        let first = classes.find(id(1));
        assert_eq!(classes.find(id(1)), first);
        assert_eq!(classes.find(id(1)), first);
        assert_eq!(classes.find(id(2)), first);
    }

    #[test]
    fn merge_is_transitive() {
        let mut classes = EquivalenceClasses::new(ids(5));
        classes.merge(id(0), id(1));
        classes.merge(id(1), id(2));
        assert_eq!(classes.find(id(0)), classes.find(id(2)));
        assert!(classes.same_class(id(2), id(0)));
        assert!(!classes.same_class(id(0), id(3)));
    }

    #[test]
    fn groups_partition_all_items() {
        let mut classes = EquivalenceClasses::new(ids(5));
        classes.merge(id(3), id(0));
        classes.merge(id(4), id(1));
        classes.merge(id(0), id(4));

        let expected: BTreeSet<Vec<ItemId>> =
            [vec![id(0), id(1), id(3), id(4)], vec![id(2)]].into_iter().collect();
        assert_eq!(membership(&classes), expected);
        assert_eq!(classes.merged_groups().len(), 1);
        assert_eq!(classes.canonical_nodes().len(), 2);
    }

    #[test]
    fn repeated_merge_is_noop() {
        let mut classes = EquivalenceClasses::new(ids(2));
        classes.merge(id(0), id(1));
        classes.merge(id(1), id(0));
        classes.merge(id(0), id(1));
        assert_eq!(classes.canonical_nodes().len(), 1);
        assert!(classes.find(id(0)).is_some());
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut classes = EquivalenceClasses::new(ids(2));
        classes.merge(id(0), id(9));
        assert_eq!(classes.find(id(9)), None);
        assert_eq!(classes.canonical(id(9)), id(9));
        assert_eq!(classes.canonical_nodes().len(), 2);
    }

    #[test]
    fn only_same_judgments_merge() {
        let mut judgments = JudgmentSet::new();
        judgments.register(Judgment::new(id(0), id(1), Relation::Same));
        judgments.register(Judgment::new(id(1), id(2), Relation::Worse));
        judgments.register(Judgment::new(id(2), id(3), Relation::Incomparable));
        judgments.register(Judgment::unresolved(id(3), id(0)));

        let classes = EquivalenceClasses::from_judgments(ids(4), &judgments);
        assert!(classes.same_class(id(0), id(1)));
        assert!(!classes.same_class(id(1), id(2)));
        assert!(!classes.same_class(id(2), id(3)));
        assert!(!classes.same_class(id(3), id(0)));
    }
}
