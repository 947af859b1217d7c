// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # prefgraph
//!
//! Consolidates pairwise judgments ("Cube is worse than Heat", "Heat equals
//! Ronin") into a preference graph and picks the next pairs worth judging.
//!
//! ## Architecture
//!
//! - **Items** (`item`): ratings export → catalog with stable ordinal ids
//! - **Judgments** (`judgment`, `log`): log parsing, one judgment per pair, append-only log
//! - **Equivalence** (`merge`): union-find over SAME judgments
//! - **Preference graph** (`graph`): WORSE/BETTER edges between canonical items
//! - **Coverage and sampling** (`coverage`, `sampler`): seeded, coverage-driven pair selection
//! - **Output** (`render`, `snapshot`): Graphviz DOT and a JSON snapshot
//!
//! ## Library usage
//!
//! ```no_run
//! use prefgraph::engine::{Engine, EngineConfig};
//! use prefgraph::item::ItemCatalog;
//! use prefgraph::log;
//!
//! let catalog = ItemCatalog::new([("Heat", Some("10".to_string())), ("Cube", None)]);
//! let judgments = log::read_judgments("<;Cube;Heat\n", &catalog).unwrap();
//! let engine = Engine::new(catalog, judgments, EngineConfig::default());
//! let next = engine.sample(15, 42);
//! println!("{}", engine.render_dot());
//! ```

pub mod config;
pub mod coverage;
pub mod engine;
pub mod error;
pub mod graph;
pub mod item;
pub mod judgment;
pub mod log;
pub mod merge;
pub mod render;
pub mod sampler;
pub mod snapshot;
