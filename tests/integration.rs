//! End-to-end tests for prefgraph.
//!
//! These tests write a ratings export and a judgment log to a temporary
//! directory, open an engine on them, and check the consolidated graph,
//! coverage, sampling and the log round trip.

use std::path::Path;

use prefgraph::config::Config;
use prefgraph::engine::Engine;
use prefgraph::error::{LogError, PrefError};
use prefgraph::item::ItemId;
use prefgraph::judgment::Relation;
use prefgraph::log;

const RATINGS: &str = "\
Const,Title,You rated
tt01,Heat,10
tt02,Ronin,9
tt03,Cube,7
tt04,Alien,10
tt05,Brazil,8
tt06,Fargo,
tt07,Gattaca,9
tt08,Jaws,10
";

fn project(dir: &Path, log_text: &str) -> Config {
    std::fs::write(dir.join("ratings.csv"), RATINGS).unwrap();
    std::fs::write(dir.join("state.txt"), log_text).unwrap();
    let mut config = Config::default();
    config.ratings.path = dir.join("ratings.csv");
    config.log.path = dir.join("state.txt");
    config.render.path = dir.join("graph.dot");
    config
}

#[test]
fn open_counts_records_and_invalid_states() {
    let dir = tempfile::TempDir::new().unwrap();
    // Four resolved records; the blank state is pending and, like the two
    // unknown symbols, reported as invalid.
    let config = project(
        dir.path(),
        "<;Cube;Heat\n>;Heat;Ronin\n=;Alien;Heat\n?;Brazil;Fargo\n ;Cube;Jaws\nx;Cube;Alien\n!;Ronin;Jaws\n",
    );
    let engine = Engine::open(&config).unwrap();
    let info = engine.info();

    assert_eq!(info.items, 8);
    assert_eq!(info.records, 7);
    assert_eq!(info.resolved, 4);
    assert_eq!(info.pending, 3);
    assert_eq!(info.anomalies, 3);
    assert_eq!(engine.anomalies()[0].line, 5);
    assert_eq!(engine.anomalies()[1].symbol, "x");
    assert_eq!(engine.anomalies()[2].symbol, "!");
}

#[test]
fn conflicting_record_keeps_first() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = project(dir.path(), "<;Cube;Heat\n<;Heat;Cube\n");
    let engine = Engine::open(&config).unwrap();

    let cube = engine.catalog().lookup("Cube").unwrap();
    let heat = engine.catalog().lookup("Heat").unwrap();
    assert_eq!(engine.judgments().conflicts().len(), 1);
    assert_eq!(engine.graph().edges().collect::<Vec<_>>(), vec![(cube, heat)]);
}

#[test]
fn same_judgment_merges_coverage_and_edges() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = project(dir.path(), "<;Heat;Ronin\n=;Heat;Alien\n");
    let engine = Engine::open(&config).unwrap();

    let heat = engine.catalog().lookup("Heat").unwrap();
    let ronin = engine.catalog().lookup("Ronin").unwrap();
    let alien = engine.catalog().lookup("Alien").unwrap();
    let root = engine.classes().canonical(heat);

    assert_eq!(engine.classes().canonical(alien), root);
    assert_eq!(engine.coverage().count(root), 2);
    assert_eq!(engine.coverage().count(ronin), 1);
    let merged_away = if root == heat { alien } else { heat };
    assert!(engine.graph().nodes().all(|n| n != merged_away));
    assert_eq!(engine.merged_titles().len(), 1);
}

#[test]
fn sampling_is_deterministic_and_unique() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = project(dir.path(), "<;Cube;Heat\n=;Alien;Jaws\n");
    let engine = Engine::open(&config).unwrap();

    let first = engine.sample(8, 4_362_376_737);
    let second = engine.sample(8, 4_362_376_737);
    assert_eq!(first, second);

    for pair in &first.candidates {
        assert_ne!(pair.first, pair.second);
        let a = engine.catalog().lookup(&pair.first).unwrap();
        let b = engine.catalog().lookup(&pair.second).unwrap();
        assert!(!engine.judgments().contains(a, b));
    }
    assert_eq!(
        first.candidates.len() + first.collisions.len(),
        first.anchors.len()
    );
}

#[test]
fn appended_candidates_reload_as_pending() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = project(dir.path(), "<;Cube;Heat\n");
    let engine = Engine::open(&config).unwrap();

    let outcome = engine.sample(8, 7);
    let written = engine.append_candidates(&config.log.path, &outcome).unwrap();
    assert_eq!(written, outcome.candidates.len());

    let reopened = Engine::open(&config).unwrap();
    assert_eq!(reopened.info().resolved, 1);
    assert_eq!(reopened.info().pending, written);
    assert_eq!(reopened.info().records, 1 + written);

    // Pending pairs are skipped by the next round.
    let next = reopened.sample(8, 7);
    assert!(next.candidates.is_disjoint(&outcome.candidates));
}

#[test]
fn missing_log_is_an_empty_run() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut config = project(dir.path(), "");
    config.log.path = dir.path().join("absent.txt");
    let engine = Engine::open(&config).unwrap();

    assert!(engine.judgments().is_empty());
    assert_eq!(engine.graph().node_count(), 8);
    assert_eq!(engine.graph().edge_count(), 0);
    assert!(engine.coverage().iter().all(|(_, count)| count == 0));
}

#[test]
fn malformed_line_fails_the_load() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = project(dir.path(), "<;Cube;Heat\n<;Cube\n");
    let err = Engine::open(&config).unwrap_err();
    assert!(matches!(
        err,
        PrefError::Log(LogError::Malformed { line: 2, .. })
    ));
}

#[test]
fn unknown_title_fails_the_load() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = project(dir.path(), "<;Cube;Predator\n");
    assert!(matches!(
        Engine::open(&config),
        Err(PrefError::Log(LogError::UnknownTitle { .. }))
    ));
}

#[test]
fn rendered_file_uses_rating_colors() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = project(dir.path(), "<;Cube;Heat\n<;Fargo;Cube\n");
    let engine = Engine::open(&config).unwrap();
    engine.render_to_path(&config.render.path).unwrap();

    let dot = std::fs::read_to_string(&config.render.path).unwrap();
    let heat = ItemId::new(0);
    let cube = ItemId::new(2);
    let fargo = ItemId::new(5);
    assert!(dot.contains(&format!("  {cube} -> {heat};")));
    assert!(dot.contains(&format!("  {fargo} -> {cube};")));
    assert!(dot.contains(&format!("  {heat} [shape=circle, fillcolor=red")));
    assert!(dot.contains(&format!("  {cube} [shape=circle, fillcolor=yellow")));
    assert!(dot.contains(&format!("  {fargo} [shape=circle, fillcolor=white")));
}

#[test]
fn read_judgments_matches_open() {
    let dir = tempfile::TempDir::new().unwrap();
    let text = "<;Cube;Heat\n>;Jaws;Alien\n";
    let config = project(dir.path(), text);
    let engine = Engine::open(&config).unwrap();
    let loaded = log::read_judgments(text, engine.catalog()).unwrap();

    assert_eq!(loaded.judgments.len(), engine.judgments().len());
    let jaws = engine.catalog().lookup("Jaws").unwrap();
    let alien = engine.catalog().lookup("Alien").unwrap();
    let stored = loaded
        .judgments
        .iter()
        .find(|j| j.key() == prefgraph::judgment::PairKey::new(jaws, alien))
        .unwrap();
    assert_eq!(stored.relation, Some(Relation::Better));
}

#[test]
fn separator_title_does_not_block_appending() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut config = project(dir.path(), "<;Heat;Ronin\n>;Cube;Alien\n<;Jaws;Heat\n");
    std::fs::write(
        &config.ratings.path,
        "Title,You rated\nHeat,10\nRonin,9\nCube,7\nAlien,10\nUp; Down,8\nJaws,10\n",
    )
    .unwrap();
    config.sampling.size = 3;

    for seed in 0..20 {
        let engine = Engine::open(&config).unwrap();
        let outcome = engine.sample(config.sampling.size, seed);
        let written = engine.append_candidates(&config.log.path, &outcome).unwrap();
        assert_eq!(written, outcome.candidates.len());
    }

    let reopened = Engine::open(&config).unwrap();
    assert_eq!(reopened.info().resolved, 3);
    assert!(reopened.info().pending > 0);
    let log_text = std::fs::read_to_string(&config.log.path).unwrap();
    assert!(!log_text.contains("Up; Down"));
}

#[test]
fn repeated_title_is_never_paired_with_itself() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = project(dir.path(), "");
    std::fs::write(
        &config.ratings.path,
        "Title,You rated\nSolaris,8\nSolaris,9\nHeat,10\n",
    )
    .unwrap();

    let engine = Engine::open(&config).unwrap();
    for seed in 0..20 {
        let outcome = engine.sample(3, seed);
        for pair in &outcome.candidates {
            assert_ne!(pair.first, pair.second);
        }
    }
}
