//! Items and the catalog that owns them.
//!
//! Items are loaded once from the ratings export. Each row's position assigns
//! a stable [`ItemId`], independent of the title string, and the catalog keeps
//! a reverse map for exact-title lookups.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::RatingsConfig;
use crate::error::ItemError;

pub type ItemResult<T> = std::result::Result<T, ItemError>;

/// Stable identifier for an item: its ordinal row in the ratings source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(u32);

impl ItemId {
    pub fn new(ordinal: u32) -> Self {
        Self(ordinal)
    }

    /// Ordinal position in the ratings source.
    pub fn get(self) -> u32 {
        self.0
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// A rated item (movie).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    /// External rating label, e.g. `"10"`. Free-form, may be absent.
    pub rating: Option<String>,
}

/// All items of a run, indexed by id and by exact title.
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    items: Vec<Item>,
    by_title: HashMap<String, ItemId>,
}

impl ItemCatalog {
    /// Build a catalog from `(title, rating)` rows in source order.
    ///
    /// When a title repeats, lookups resolve to its first row; the later rows
    /// still get their own ids.
    pub fn new<I, T>(rows: I) -> Self
    where
        I: IntoIterator<Item = (T, Option<String>)>,
        T: Into<String>,
    {
        let mut catalog = Self::default();
        for (title, rating) in rows {
            catalog.push(title.into(), rating);
        }
        catalog
    }

    fn push(&mut self, title: String, rating: Option<String>) {
        let id = ItemId::new(self.items.len() as u32);
        match self.by_title.get(&title) {
            Some(existing) => {
                tracing::warn!(
                    %title,
                    first = %existing,
                    duplicate = %id,
                    "duplicate title in ratings, lookups use the first row"
                );
            }
            None => {
                self.by_title.insert(title.clone(), id);
            }
        }
        self.items.push(Item { id, title, rating });
    }

    /// Resolve an exact title to its item id.
    pub fn lookup(&self, title: &str) -> ItemResult<ItemId> {
        self.by_title
            .get(title)
            .copied()
            .ok_or_else(|| ItemError::UnknownTitle {
                title: title.to_string(),
            })
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.get(id.index())
    }

    /// Title for `id`, falling back to the id's display form.
    pub fn title(&self, id: ItemId) -> String {
        self.get(id)
            .map(|item| item.title.clone())
            .unwrap_or_else(|| id.to_string())
    }

    pub fn rating(&self, id: ItemId) -> Option<&str> {
        self.get(id).and_then(|item| item.rating.as_deref())
    }

    pub fn ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.items.iter().map(|item| item.id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Read items from a CSV ratings export.
///
/// The first row is the header. The title column is required; a missing
/// rating column or an empty rating cell yields `rating: None`.
pub fn load_items<R: Read>(reader: R, config: &RatingsConfig) -> ItemResult<ItemCatalog> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| ItemError::Csv {
            message: e.to_string(),
        })?
        .clone();
    let column = |name: &str| headers.iter().position(|h| h.trim() == name);

    let title_idx = column(&config.title_column).ok_or_else(|| ItemError::MissingColumn {
        column: config.title_column.clone(),
    })?;
    let rating_idx = column(&config.rating_column);
    if rating_idx.is_none() {
        tracing::warn!(
            column = %config.rating_column,
            "rating column missing, every item is unrated"
        );
    }

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record.map_err(|e| ItemError::Csv {
            message: e.to_string(),
        })?;
        let title = record.get(title_idx).unwrap_or_default().trim().to_string();
        let rating = rating_idx
            .and_then(|idx| record.get(idx))
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);
        rows.push((title, rating));
    }

    let catalog = ItemCatalog::new(rows);
    tracing::debug!(items = catalog.len(), "loaded ratings");
    Ok(catalog)
}

/// Read items from a CSV file on disk.
pub fn load_items_from_path(path: &Path, config: &RatingsConfig) -> ItemResult<ItemCatalog> {
    let file = std::fs::File::open(path).map_err(|e| ItemError::Read {
        path: path.display().to_string(),
        source: e,
    })?;
    load_items(file, config)
}
