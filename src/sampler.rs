//! Picking the next pairs to judge.
//!
//! The least covered canonical nodes become anchors. Each anchor is paired
//! with one item drawn uniformly from the whole catalog (items, not canonical
//! nodes, so merged siblings can still be compared). Ids are resolved through
//! their titles first, so a repeated title counts as one item. Draws that hit
//! the anchor itself, a title the log cannot hold, an already judged pair or a
//! pair proposed earlier in the same call are skipped, not retried. Titles
//! containing `;` are never anchors. The generator is seeded explicitly, so
//! the same seed, size and judgments always give the same candidates.

use std::collections::BTreeSet;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::coverage::Coverage;
use crate::item::{ItemCatalog, ItemId};
use crate::judgment::{FIELD_SEPARATOR, JudgmentSet};

/// Pair of titles in title order, ready to be written to the log.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CandidatePair {
    pub first: String,
    pub second: String,
}

impl CandidatePair {
    /// Order the two titles so the pair has one spelling.
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        let (a, b) = (a.into(), b.into());
        if a <= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }
}

impl std::fmt::Display for CandidatePair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} / {}", self.first, self.second)
    }
}

/// Why a draw was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionReason {
    /// The drawn item is the anchor itself.
    SameItem,
    /// The pair already has a judgment, pending ones included.
    AlreadyJudged,
    /// The pair was proposed earlier in this call.
    AlreadyProposed,
    /// The drawn title contains the log field separator.
    Unwritable,
}

impl std::fmt::Display for CollisionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollisionReason::SameItem => write!(f, "same item"),
            CollisionReason::AlreadyJudged => write!(f, "already judged"),
            CollisionReason::AlreadyProposed => write!(f, "already proposed"),
            CollisionReason::Unwritable => write!(f, "title cannot be written to the log"),
        }
    }
}

/// A skipped draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collision {
    pub anchor: ItemId,
    pub drawn: ItemId,
    pub reason: CollisionReason,
}

/// Result of one sampling call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleOutcome {
    /// The least covered nodes used as anchors, in draw order.
    pub anchors: Vec<ItemId>,
    /// Accepted pairs, sorted.
    pub candidates: BTreeSet<CandidatePair>,
    pub collisions: Vec<Collision>,
}

impl SampleOutcome {
    pub fn candidate_list(&self) -> Vec<CandidatePair> {
        self.candidates.iter().cloned().collect()
    }
}

/// Proposes new pairs from the current judgments and coverage.
pub struct CandidateSampler<'a> {
    catalog: &'a ItemCatalog,
    judgments: &'a JudgmentSet,
    coverage: &'a Coverage,
}

impl<'a> CandidateSampler<'a> {
    pub fn new(catalog: &'a ItemCatalog, judgments: &'a JudgmentSet, coverage: &'a Coverage) -> Self {
        Self {
            catalog,
            judgments,
            coverage,
        }
    }

    /// Row that title lookups resolve to. Repeated titles share the first row.
    fn resolve(&self, id: ItemId) -> ItemId {
        self.catalog.lookup(&self.catalog.title(id)).unwrap_or(id)
    }

    fn writable(&self, id: ItemId) -> bool {
        !self.catalog.title(id).contains(FIELD_SEPARATOR)
    }

    /// The `n` least covered nodes whose titles can go into the log.
    fn anchors(&self, n: usize) -> Vec<ItemId> {
        self.coverage
            .ascending()
            .into_iter()
            .map(|(node, _)| node)
            .filter(|&node| {
                let writable = self.writable(node);
                if !writable {
                    tracing::warn!(
                        %node,
                        title = %self.catalog.title(node),
                        "title contains the log separator, not used as anchor"
                    );
                }
                writable
            })
            .take(n)
            .collect()
    }

    /// Draw one partner for each of the `n` least covered nodes.
    pub fn sample(&self, n: usize, seed: u64) -> SampleOutcome {
        let mut rng = StdRng::seed_from_u64(seed);
        let universe: Vec<ItemId> = self.catalog.ids().collect();
        let anchors = self.anchors(n);
        tracing::info!(
            seed,
            anchors = ?anchors.iter().map(ToString::to_string).collect::<Vec<_>>(),
            "lowest coverage"
        );

        let mut outcome = SampleOutcome {
            anchors: anchors.clone(),
            ..Default::default()
        };
        let mut proposed: BTreeSet<(ItemId, ItemId)> = BTreeSet::new();

        for anchor in anchors {
            let Some(&drawn) = universe.choose(&mut rng) else {
                break;
            };
            let (anchor, drawn) = (self.resolve(anchor), self.resolve(drawn));
            let key = (anchor.min(drawn), anchor.max(drawn));
            let reason = if drawn == anchor {
                Some(CollisionReason::SameItem)
            } else if !self.writable(drawn) {
                Some(CollisionReason::Unwritable)
            } else if self.judgments.contains(anchor, drawn) {
                Some(CollisionReason::AlreadyJudged)
            } else if proposed.contains(&key) {
                Some(CollisionReason::AlreadyProposed)
            } else {
                None
            };

            if let Some(reason) = reason {
                tracing::info!(%anchor, %drawn, %reason, "collision, skipping");
                outcome.collisions.push(Collision {
                    anchor,
                    drawn,
                    reason,
                });
                continue;
            }

            proposed.insert(key);
            outcome.candidates.insert(CandidatePair::new(
                self.catalog.title(anchor),
                self.catalog.title(drawn),
            ));
        }

        tracing::debug!(
            candidates = outcome.candidates.len(),
            collisions = outcome.collisions.len(),
            "sampling done"
        );
        outcome
    }
}
