//! Graphviz DOT output for the preference graph.
//!
//! The output is a purely structural translation: graph attributes, one edge
//! line per stored edge sorted by `(from, to)`, and one node line per
//! canonical node filled with the color of its rating. Layout is left to
//! `dot`, e.g. `dot -Tpng graph.dot -o graph.png`.

use std::fmt::Write as _;
use std::path::Path;

use crate::config::{NodeLabel, RenderConfig};
use crate::error::RenderError;
use crate::graph::PreferenceGraph;
use crate::item::{ItemCatalog, ItemId};

pub type RenderResult<T> = std::result::Result<T, RenderError>;

/// Renders a [`PreferenceGraph`] as DOT text.
#[derive(Debug, Clone)]
pub struct DotRenderer<'a> {
    config: &'a RenderConfig,
}

impl<'a> DotRenderer<'a> {
    pub fn new(config: &'a RenderConfig) -> Self {
        Self { config }
    }

    /// Fill color for a rating label, falling back for absent or unmapped ratings.
    pub fn color_for(&self, rating: Option<&str>) -> &str {
        rating
            .and_then(|r| self.config.colors.get(r))
            .map(String::as_str)
            .unwrap_or(self.config.fallback_color.as_str())
    }

    fn label_for(&self, node: ItemId, catalog: &ItemCatalog) -> String {
        match self.config.label {
            NodeLabel::Id => node.to_string(),
            NodeLabel::Title => escape(&catalog.title(node)),
        }
    }

    pub fn render(&self, graph: &PreferenceGraph, catalog: &ItemCatalog) -> String {
        let deduped;
        let graph = if self.config.dedup_edges {
            deduped = graph.dedup();
            &deduped
        } else {
            graph
        };

        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = writeln!(out, "digraph {} {{", self.config.name);
        let _ = writeln!(out, "rankdir={};", self.config.rankdir);
        let _ = writeln!(out, "size=\"{}\";", self.config.size);
        let _ = writeln!(out, "dpi=\"{}\";", self.config.dpi);
        let _ = writeln!(out, "ratio=\"{}\";", self.config.ratio);

        for (from, to) in graph.sorted_edges() {
            let _ = writeln!(out, "  {from} -> {to};");
        }

        for node in graph.nodes() {
            let _ = writeln!(
                out,
                "  {node} [shape=circle, fillcolor={} style=filled label = \"{}\"];",
                self.color_for(catalog.rating(node)),
                self.label_for(node, catalog),
            );
        }

        out.push_str("}\n");
        out
    }

    /// Render and write to `path`.
    pub fn render_to_path(
        &self,
        graph: &PreferenceGraph,
        catalog: &ItemCatalog,
        path: &Path,
    ) -> RenderResult<()> {
        std::fs::write(path, self.render(graph, catalog)).map_err(|e| RenderError::Write {
            path: path.display().to_string(),
            source: e,
        })?;
        tracing::info!(
            path = %path.display(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "wrote graph"
        );
        Ok(())
    }
}

/// `id title` lines for every canonical node, to read id-labelled plots.
pub fn legend(graph: &PreferenceGraph, catalog: &ItemCatalog) -> Vec<String> {
    graph
        .nodes()
        .map(|node| format!("{node} {}", catalog.title(node)))
        .collect()
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judgment::{Judgment, JudgmentSet, Relation};
    use crate::merge::EquivalenceClasses;

    fn id(n: u32) -> ItemId {
        ItemId::new(n)
    }

    fn fixture() -> (ItemCatalog, PreferenceGraph) {
        let catalog = ItemCatalog::new([
            ("Heat", Some("10".to_string())),
            ("Cube", Some("6".to_string())),
            ("\"Ronin\"", None),
        ]);
        let set = JudgmentSet::from_records(&[
            Judgment::new(id(1), id(0), Relation::Worse),
            Judgment::new(id(2), id(1), Relation::Better),
        ]);
        let classes = EquivalenceClasses::from_judgments(catalog.ids(), &set);
        let graph = PreferenceGraph::build(&set, &classes);
        (catalog, graph)
    }

    #[test]
    fn renders_header_edges_and_nodes() {
        let (catalog, graph) = fixture();
        let config = RenderConfig::default();
        let dot = DotRenderer::new(&config).render(&graph, &catalog);

        let expected = "\
digraph test {
rankdir=BT;
size=\"20, 5\";
dpi=\"500\";
ratio=\"fill\";
  n1 -> n0;
  n1 -> n2;
  n0 [shape=circle, fillcolor=red style=filled label = \"n0\"];
  n1 [shape=circle, fillcolor=white style=filled label = \"n1\"];
  n2 [shape=circle, fillcolor=white style=filled label = \"n2\"];
}
";
        assert_eq!(dot, expected);
    }

    #[test]
    fn title_labels_are_escaped() {
        let (catalog, graph) = fixture();
        let config = RenderConfig {
            label: NodeLabel::Title,
            ..Default::default()
        };
        let dot = DotRenderer::new(&config).render(&graph, &catalog);
        assert!(dot.contains("label = \"\\\"Ronin\\\"\""));
        assert!(dot.contains("label = \"Heat\""));
    }

    #[test]
    fn color_lookup_falls_back() {
        let config = RenderConfig::default();
        let renderer = DotRenderer::new(&config);
        assert_eq!(renderer.color_for(Some("9")), "green");
        assert_eq!(renderer.color_for(Some("3")), "white");
        assert_eq!(renderer.color_for(None), "white");
    }

    #[test]
    fn dedup_option_collapses_repeated_edges() {
        let catalog = ItemCatalog::new([("A", None), ("B", None), ("C", None)]);
        let set = JudgmentSet::from_records(&[
            Judgment::new(id(0), id(2), Relation::Same),
            Judgment::new(id(0), id(1), Relation::Worse),
            Judgment::new(id(2), id(1), Relation::Worse),
        ]);
        let classes = EquivalenceClasses::from_judgments(catalog.ids(), &set);
        let graph = PreferenceGraph::build(&set, &classes);

        let raw = DotRenderer::new(&RenderConfig::default()).render(&graph, &catalog);
        assert_eq!(raw.matches("  n0 -> n1;").count(), 2);

        let config = RenderConfig {
            dedup_edges: true,
            ..Default::default()
        };
        let deduped = DotRenderer::new(&config).render(&graph, &catalog);
        assert_eq!(deduped.matches("  n0 -> n1;").count(), 1);
    }

    #[test]
    fn legend_lists_canonical_nodes() {
        let (catalog, graph) = fixture();
        assert_eq!(
            legend(&graph, &catalog),
            vec!["n0 Heat", "n1 Cube", "n2 \"Ronin\""]
        );
    }

    #[test]
    fn render_to_path_writes_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("graph.dot");
        let (catalog, graph) = fixture();
        let config = RenderConfig::default();
        DotRenderer::new(&config)
            .render_to_path(&graph, &catalog, &path)
            .unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with("digraph test {"));
    }
}
