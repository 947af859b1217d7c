//! Persisted form of the consolidated judgments.
//!
//! Each entry keys its pair with two separate title fields rather than one
//! joined string, so titles containing `;` (or any other separator) survive a
//! save/load cycle unchanged.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ItemError, SnapshotError};
use crate::item::ItemCatalog;
use crate::judgment::{Judgment, JudgmentSet, Relation};

pub type SnapshotResult<T> = std::result::Result<T, SnapshotError>;

/// One resolved pair: "`a` {relation} `b`", with `a <= b`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub a: String,
    pub b: String,
    pub relation: Relation,
}

impl SnapshotEntry {
    /// Put the titles in order, flipping the relation if needed.
    pub fn new(subject: impl Into<String>, object: impl Into<String>, relation: Relation) -> Self {
        let (subject, object) = (subject.into(), object.into());
        if subject <= object {
            Self {
                a: subject,
                b: object,
                relation,
            }
        } else {
            Self {
                a: object,
                b: subject,
                relation: relation.reversed(),
            }
        }
    }
}

/// All resolved judgments of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub entries: Vec<SnapshotEntry>,
}

impl Snapshot {
    /// Snapshot the resolved judgments; pending records are left out.
    pub fn from_judgments(judgments: &JudgmentSet, catalog: &ItemCatalog) -> Self {
        let mut entries: Vec<SnapshotEntry> = judgments
            .resolved()
            .filter_map(|j| {
                let relation = j.relation?;
                Some(SnapshotEntry::new(
                    catalog.title(j.subject),
                    catalog.title(j.object),
                    relation,
                ))
            })
            .collect();
        entries.sort_by(|x, y| (&x.a, &x.b).cmp(&(&y.a, &y.b)));
        Self { entries }
    }

    /// Resolve the titles again and register every entry.
    pub fn to_judgments(&self, catalog: &ItemCatalog) -> Result<JudgmentSet, ItemError> {
        let mut set = JudgmentSet::new();
        for entry in &self.entries {
            let subject = catalog.lookup(&entry.a)?;
            let object = catalog.lookup(&entry.b)?;
            set.register(Judgment::new(subject, object, entry.relation));
        }
        Ok(set)
    }

    /// Pair → relation, keyed by the ordered titles.
    pub fn relations(&self) -> BTreeMap<(String, String), Relation> {
        self.entries
            .iter()
            .map(|e| ((e.a.clone(), e.b.clone()), e.relation))
            .collect()
    }

    pub fn to_json(&self) -> SnapshotResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| SnapshotError::Serialization {
            message: e.to_string(),
        })
    }

    pub fn from_json(json: &str) -> SnapshotResult<Self> {
        serde_json::from_str(json).map_err(|e| SnapshotError::Serialization {
            message: e.to_string(),
        })
    }

    pub fn save(&self, path: &Path) -> SnapshotResult<()> {
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|e| SnapshotError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }

    pub fn load(path: &Path) -> SnapshotResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| SnapshotError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_json(&json)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
