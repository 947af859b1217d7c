//! Engine facade: top-level API for prefgraph.
//!
//! The `Engine` owns the item catalog and the consolidated judgments of one
//! run, and derives the equivalence classes, preference graph and coverage
//! from them up front. Nothing is loaded implicitly: callers either pass the
//! inputs to [`Engine::new`] or ask [`Engine::open`] to read the files named
//! in a [`Config`].

use std::path::Path;

use crate::config::{Config, RenderConfig};
use crate::coverage::{Coverage, CoveragePolicy};
use crate::error::PrefResult;
use crate::graph::PreferenceGraph;
use crate::graph::analytics;
use crate::item::{self, ItemCatalog, ItemId};
use crate::judgment::{Anomaly, JudgmentSet};
use crate::log::{self, LoadedLog};
use crate::merge::EquivalenceClasses;
use crate::render::{self, DotRenderer};
use crate::sampler::{CandidateSampler, SampleOutcome};
use crate::snapshot::Snapshot;

/// Configuration for the engine.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Which relations count toward coverage (and so steer sampling).
    pub coverage: CoveragePolicy,
    pub render: RenderConfig,
}

impl From<&Config> for EngineConfig {
    fn from(config: &Config) -> Self {
        Self {
            coverage: config.coverage,
            render: config.render.clone(),
        }
    }
}

/// One run's consolidated preference structure.
pub struct Engine {
    config: EngineConfig,
    catalog: ItemCatalog,
    judgments: JudgmentSet,
    record_count: usize,
    anomalies: Vec<Anomaly>,
    classes: EquivalenceClasses,
    graph: PreferenceGraph,
    coverage: Coverage,
}

impl Engine {
    /// Consolidate a loaded log against the catalog.
    pub fn new(catalog: ItemCatalog, log: LoadedLog, config: EngineConfig) -> Self {
        let classes = EquivalenceClasses::from_judgments(catalog.ids(), &log.judgments);
        let graph = PreferenceGraph::build(&log.judgments, &classes);
        let coverage = Coverage::compute(&log.judgments, &classes, config.coverage);

        tracing::info!(
            items = catalog.len(),
            pairs = log.judgments.len(),
            classes = classes.canonical_nodes().len(),
            edges = graph.edge_count(),
            "consolidated judgments"
        );

        Self {
            config,
            catalog,
            record_count: log.records.len(),
            judgments: log.judgments,
            anomalies: log.anomalies,
            classes,
            graph,
            coverage,
        }
    }

    /// Build from an already consolidated judgment set.
    pub fn with_judgments(catalog: ItemCatalog, judgments: JudgmentSet, config: EngineConfig) -> Self {
        let records = judgments.iter().copied().collect();
        Self::new(
            catalog,
            LoadedLog {
                judgments,
                records,
                anomalies: Vec::new(),
            },
            config,
        )
    }

    /// Load the ratings and the judgment log named in `config`.
    pub fn open(config: &Config) -> PrefResult<Self> {
        let catalog = item::load_items_from_path(&config.ratings.path, &config.ratings)?;
        let log = log::load_judgments(&config.log.path, &catalog)?;
        Ok(Self::new(catalog, log, EngineConfig::from(config)))
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &ItemCatalog {
        &self.catalog
    }

    pub fn judgments(&self) -> &JudgmentSet {
        &self.judgments
    }

    pub fn anomalies(&self) -> &[Anomaly] {
        &self.anomalies
    }

    pub fn classes(&self) -> &EquivalenceClasses {
        &self.classes
    }

    pub fn graph(&self) -> &PreferenceGraph {
        &self.graph
    }

    pub fn coverage(&self) -> &Coverage {
        &self.coverage
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Propose new pairs for the `n` least covered items.
    pub fn sample(&self, n: usize, seed: u64) -> SampleOutcome {
        CandidateSampler::new(&self.catalog, &self.judgments, &self.coverage).sample(n, seed)
    }

    /// Append the sampled candidates to the log as pending records.
    pub fn append_candidates(&self, path: &Path, outcome: &SampleOutcome) -> PrefResult<usize> {
        Ok(log::append_pending(path, &outcome.candidate_list())?)
    }

    pub fn render_dot(&self) -> String {
        DotRenderer::new(&self.config.render).render(&self.graph, &self.catalog)
    }

    pub fn render_to_path(&self, path: &Path) -> PrefResult<()> {
        DotRenderer::new(&self.config.render).render_to_path(&self.graph, &self.catalog, path)?;
        Ok(())
    }

    pub fn legend(&self) -> Vec<String> {
        render::legend(&self.graph, &self.catalog)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from_judgments(&self.judgments, &self.catalog)
    }

    /// Merged classes as title lists, keyed by canonical node.
    pub fn merged_titles(&self) -> Vec<(ItemId, Vec<String>)> {
        self.classes
            .merged_groups()
            .into_iter()
            .map(|(root, members)| {
                let titles = members.into_iter().map(|id| self.catalog.title(id)).collect();
                (root, titles)
            })
            .collect()
    }

    /// The `limit` least covered nodes with their titles.
    pub fn lowest_coverage(&self, limit: usize) -> Vec<(ItemId, String, usize)> {
        self.coverage
            .ascending()
            .into_iter()
            .take(limit)
            .map(|(node, count)| (node, self.catalog.title(node), count))
            .collect()
    }

    /// Get summary counts of the run.
    pub fn info(&self) -> EngineInfo {
        EngineInfo {
            items: self.catalog.len(),
            records: self.record_count,
            pairs: self.judgments.len(),
            resolved: self.judgments.resolved().count(),
            pending: self.judgments.pending_count(),
            anomalies: self.anomalies.len(),
            conflicts: self.judgments.conflicts().len(),
            classes: self.classes.canonical_nodes().len(),
            merged_classes: self.classes.merged_groups().len(),
            edges: self.graph.edge_count(),
            components: analytics::component_count(&self.graph),
            cycles: analytics::cycles(&self.graph).len(),
        }
    }
}

/// Summary information about a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineInfo {
    pub items: usize,
    pub records: usize,
    pub pairs: usize,
    pub resolved: usize,
    pub pending: usize,
    pub anomalies: usize,
    pub conflicts: usize,
    pub classes: usize,
    pub merged_classes: usize,
    pub edges: usize,
    pub components: usize,
    pub cycles: usize,
}

impl std::fmt::Display for EngineInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "prefgraph info")?;
        writeln!(f, "  items:       {}", self.items)?;
        writeln!(f, "  records:     {}", self.records)?;
        writeln!(f, "  pairs:       {}", self.pairs)?;
        writeln!(f, "  resolved:    {}", self.resolved)?;
        writeln!(f, "  pending:     {}", self.pending)?;
        writeln!(f, "  anomalies:   {}", self.anomalies)?;
        writeln!(f, "  conflicts:   {}", self.conflicts)?;
        writeln!(f, "  classes:     {} ({} merged)", self.classes, self.merged_classes)?;
        writeln!(f, "  edges:       {}", self.edges)?;
        writeln!(f, "  components:  {}", self.components)?;
        writeln!(f, "  cycles:      {}", self.cycles)?;
        Ok(())
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("items", &self.catalog.len())
            .field("pairs", &self.judgments.len())
            .field("edges", &self.graph.edge_count())
            .finish()
    }
}
