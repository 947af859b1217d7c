//! Pairwise judgments: parsing log records and consolidating them.
//!
//! A log record reads `relation ; subject ; object`, e.g. `<;Cube;Heat` for
//! "Cube is worse than Heat". Parsing resolves both titles against the
//! [`ItemCatalog`] and maps the symbol through a fixed table. Unknown symbols
//! (including the blank symbol of a pending record) are reported as
//! [`Anomaly`] values and keep `relation: None`; unknown titles abort.
//!
//! [`JudgmentSet`] stores at most one judgment per unordered pair. A second
//! record for the same pair with a different meaning is a [`Conflict`]: the
//! first value is kept.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use serde::{Deserialize, Serialize};

use crate::error::LogError;
use crate::item::{ItemCatalog, ItemId};

pub type LogResult<T> = std::result::Result<T, LogError>;

/// Field separator of a log record.
pub const FIELD_SEPARATOR: char = ';';

// ---------------------------------------------------------------------------
// Relation
// ---------------------------------------------------------------------------

/// How the subject of a judgment compares to its object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    /// `<`: subject is worse than object.
    Worse,
    /// `>`: subject is better than object.
    Better,
    /// `=`: no preference either way; the two items get merged.
    Same,
    /// `?`: the items cannot be compared (different genres, ...).
    Incomparable,
    /// `i`: skipped for now, e.g. the rater does not remember one of them.
    Ignore,
}

impl Relation {
    pub const ALL: [Relation; 5] = [
        Relation::Worse,
        Relation::Better,
        Relation::Same,
        Relation::Incomparable,
        Relation::Ignore,
    ];

    /// Map a log symbol to its relation.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.symbol().to_string() == symbol)
    }

    /// Log symbol for this relation.
    pub fn symbol(self) -> char {
        match self {
            Relation::Worse => '<',
            Relation::Better => '>',
            Relation::Same => '=',
            Relation::Incomparable => '?',
            Relation::Ignore => 'i',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Relation::Worse => "worse",
            Relation::Better => "better",
            Relation::Same => "same",
            Relation::Incomparable => "incomparable",
            Relation::Ignore => "ignore",
        }
    }

    /// The same judgment read with subject and object swapped.
    pub fn reversed(self) -> Self {
        match self {
            Relation::Worse => Relation::Better,
            Relation::Better => Relation::Worse,
            other => other,
        }
    }
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Judgment
// ---------------------------------------------------------------------------

/// Unordered pair of items, stored with `lo <= hi`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairKey {
    pub lo: ItemId,
    pub hi: ItemId,
}

impl PairKey {
    pub fn new(a: ItemId, b: ItemId) -> Self {
        if a <= b {
            Self { lo: a, hi: b }
        } else {
            Self { lo: b, hi: a }
        }
    }
}

impl std::fmt::Display for PairKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.lo, self.hi)
    }
}

/// One recorded comparison. `relation` reads "subject {relation} object".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Judgment {
    pub subject: ItemId,
    pub object: ItemId,
    /// `None` for pending or unparseable records.
    pub relation: Option<Relation>,
}

impl Judgment {
    pub fn new(subject: ItemId, object: ItemId, relation: Relation) -> Self {
        Self {
            subject,
            object,
            relation: Some(relation),
        }
    }

    pub fn unresolved(subject: ItemId, object: ItemId) -> Self {
        Self {
            subject,
            object,
            relation: None,
        }
    }

    pub fn key(&self) -> PairKey {
        PairKey::new(self.subject, self.object)
    }

    /// The relation re-expressed as "key.lo {relation} key.hi".
    pub fn relation_for_key(&self) -> Option<Relation> {
        if self.subject <= self.object {
            self.relation
        } else {
            self.relation.map(Relation::reversed)
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.relation.is_some()
    }
}

/// A record whose relation symbol was not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anomaly {
    /// 1-based line number in the log.
    pub line: usize,
    pub symbol: String,
    pub subject: String,
    pub object: String,
}

impl std::fmt::Display for Anomaly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "line {}: state `{}` for {}; {} is invalid",
            self.line, self.symbol, self.subject, self.object
        )
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Result of parsing one non-empty log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    pub judgment: Judgment,
    pub anomaly: Option<Anomaly>,
}

/// Every record of a log, in file order.
#[derive(Debug, Clone, Default)]
pub struct ParsedLog {
    /// All parsed records, resolved or not.
    pub records: Vec<Judgment>,
    pub anomalies: Vec<Anomaly>,
}

impl ParsedLog {
    pub fn resolved_count(&self) -> usize {
        self.records.iter().filter(|j| j.is_resolved()).count()
    }
}

/// Parse a single log line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: usize, text: &str, catalog: &ItemCatalog) -> LogResult<Option<ParsedLine>> {
    if text.trim().is_empty() {
        return Ok(None);
    }

    let fields: Vec<&str> = text.split(FIELD_SEPARATOR).map(str::trim).collect();
    let [symbol, subject_title, object_title] = fields[..] else {
        return Err(LogError::Malformed {
            line,
            content: text.trim_end().to_string(),
        });
    };

    let resolve = |title: &str| {
        catalog.lookup(title).map_err(|_| LogError::UnknownTitle {
            line,
            title: title.to_string(),
        })
    };
    let subject = resolve(subject_title)?;
    let object = resolve(object_title)?;

    let relation = Relation::from_symbol(symbol);
    let anomaly = match relation {
        Some(_) => None,
        None => {
            tracing::warn!(
                line,
                symbol,
                subject = subject_title,
                object = object_title,
                "invalid relation symbol, judgment left unresolved"
            );
            Some(Anomaly {
                line,
                symbol: symbol.to_string(),
                subject: subject_title.to_string(),
                object: object_title.to_string(),
            })
        }
    };

    Ok(Some(ParsedLine {
        judgment: Judgment {
            subject,
            object,
            relation,
        },
        anomaly,
    }))
}

/// Parse a whole log. Fails on the first malformed line or unknown title.
pub fn parse_log(text: &str, catalog: &ItemCatalog) -> LogResult<ParsedLog> {
    let mut parsed = ParsedLog::default();
    for (idx, line) in text.lines().enumerate() {
        if let Some(ParsedLine { judgment, anomaly }) = parse_line(idx + 1, line, catalog)? {
            parsed.records.push(judgment);
            parsed.anomalies.extend(anomaly);
        }
    }
    Ok(parsed)
}

/// Render one log line.
///
/// `None` writes a blank relation, which marks the pair as pending.
pub fn format_record(relation: Option<Relation>, subject: &str, object: &str) -> LogResult<String> {
    for title in [subject, object] {
        if title.contains(FIELD_SEPARATOR) {
            return Err(LogError::SeparatorInTitle {
                title: title.to_string(),
            });
        }
    }
    let symbol = relation.map(Relation::symbol).unwrap_or(' ');
    Ok(format!("{symbol};{subject};{object}"))
}

// ---------------------------------------------------------------------------
// Consolidation
// ---------------------------------------------------------------------------

/// Outcome of [`JudgmentSet::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// First judgment for this pair.
    Inserted,
    /// A pending record was replaced by a resolved one.
    Resolved,
    /// Same meaning as the stored judgment (or a pending record for a judged pair).
    Duplicate,
    /// Different meaning; the stored judgment was kept.
    Conflict,
}

/// A rejected re-registration, expressed in key order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conflict {
    pub key: PairKey,
    pub kept: Relation,
    pub rejected: Relation,
}

/// Consolidated judgments: one per unordered pair.
#[derive(Debug, Clone, Default)]
pub struct JudgmentSet {
    entries: BTreeMap<PairKey, Judgment>,
    /// Pair keys in the order their first record was registered.
    order: Vec<PairKey>,
    conflicts: Vec<Conflict>,
}

impl JudgmentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every record in order.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a Judgment>) -> Self {
        let mut set = Self::new();
        for judgment in records {
            set.register(*judgment);
        }
        set
    }

    /// Store a judgment unless its pair is already judged.
    pub fn register(&mut self, judgment: Judgment) -> Registration {
        let key = judgment.key();
        let mut slot = match self.entries.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(judgment);
                self.order.push(key);
                return Registration::Inserted;
            }
            Entry::Occupied(slot) => slot,
        };

        match (slot.get().relation_for_key(), judgment.relation_for_key()) {
            (None, Some(_)) => {
                slot.insert(judgment);
                Registration::Resolved
            }
            (_, None) => Registration::Duplicate,
            (Some(kept), Some(rejected)) if kept == rejected => {
                tracing::debug!(%key, relation = %kept, "duplicate judgment");
                Registration::Duplicate
            }
            (Some(kept), Some(rejected)) => {
                tracing::warn!(
                    %key,
                    %kept,
                    %rejected,
                    "conflicting judgment, keeping the existing one"
                );
                self.conflicts.push(Conflict {
                    key,
                    kept,
                    rejected,
                });
                Registration::Conflict
            }
        }
    }

    pub fn get(&self, key: PairKey) -> Option<&Judgment> {
        self.entries.get(&key)
    }

    /// Whether the pair has any stored judgment (pending ones included).
    pub fn contains(&self, a: ItemId, b: ItemId) -> bool {
        self.entries.contains_key(&PairKey::new(a, b))
    }

    /// All stored judgments in key order.
    pub fn iter(&self) -> impl Iterator<Item = &Judgment> {
        self.entries.values()
    }

    /// All stored judgments in registration order.
    ///
    /// A pair keeps the position of its first record, even when a later
    /// record resolved it.
    pub fn in_log_order(&self) -> impl Iterator<Item = &Judgment> {
        self.order.iter().filter_map(|key| self.entries.get(key))
    }

    pub fn resolved(&self) -> impl Iterator<Item = &Judgment> {
        self.iter().filter(|j| j.is_resolved())
    }

    pub fn pending_count(&self) -> usize {
        self.iter().filter(|j| !j.is_resolved()).count()
    }

    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
