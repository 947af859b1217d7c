//! prefgraph CLI: consolidate pairwise judgments and pick what to compare next.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use prefgraph::config::{Config, DEFAULT_CONFIG_FILE};
use prefgraph::engine::Engine;
use prefgraph::snapshot::Snapshot;

#[derive(Parser)]
#[command(name = "prefgraph", version, about = "Pairwise preference graph")]
struct Cli {
    /// Path to the TOML config (defaults apply when it does not exist).
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Ratings CSV export (overrides `ratings.path`).
    #[arg(long, global = true)]
    ratings: Option<PathBuf>,

    /// Judgment log (overrides `log.path`).
    #[arg(long, global = true)]
    log: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show counts for the current judgments.
    Info,

    /// Report invalid records and conflicting judgments.
    Check,

    /// Write the preference graph as Graphviz DOT.
    Render {
        /// Output path (overrides `render.path`).
        #[arg(long)]
        out: Option<PathBuf>,

        /// Collapse repeated edges between the same pair.
        #[arg(long)]
        dedup: bool,
    },

    /// Propose new pairs for the least covered items.
    Sample {
        /// Number of least covered items to pair up.
        #[arg(long)]
        size: Option<usize>,

        /// Random seed.
        #[arg(long)]
        seed: Option<u64>,

        /// Print the candidates without appending them to the log.
        #[arg(long)]
        dry_run: bool,
    },

    /// List the least covered items.
    Coverage {
        /// Number of items to show.
        #[arg(long, default_value = "15")]
        limit: usize,
    },

    /// List items merged through SAME judgments.
    Groups,

    /// Export or inspect consolidated judgment snapshots.
    Snapshot {
        #[command(subcommand)]
        action: SnapshotAction,
    },

    /// Write a config file with every default spelled out.
    InitConfig {
        /// Output path.
        #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
        out: PathBuf,
    },
}

#[derive(Subcommand)]
enum SnapshotAction {
    /// Export resolved judgments as JSON.
    Export {
        /// Output path.
        #[arg(long)]
        out: PathBuf,
    },
    /// Load a snapshot and check it against the ratings.
    Check {
        /// Snapshot path.
        #[arg(long)]
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let Cli {
        config: config_path,
        ratings,
        log,
        command,
    } = Cli::parse();
    let load = || load_config(&config_path, ratings.clone(), log.clone());

    match command {
        Commands::InitConfig { out } => {
            Config::default().save(&out).into_diagnostic()?;
            println!("Wrote default config to {}", out.display());
        }

        Commands::Info => {
            let config = load()?;
            let engine = Engine::open(&config).into_diagnostic()?;
            println!("{}", engine.info());
        }

        Commands::Check => {
            let config = load()?;
            let engine = Engine::open(&config).into_diagnostic()?;
            let anomalies = engine.anomalies();
            let conflicts = engine.judgments().conflicts();
            if anomalies.is_empty() && conflicts.is_empty() {
                println!("No invalid records or conflicts.");
            }
            if !anomalies.is_empty() {
                println!("Invalid records ({}):", anomalies.len());
                for anomaly in anomalies {
                    println!("  {anomaly}");
                }
            }
            if !conflicts.is_empty() {
                println!("Conflicts ({}):", conflicts.len());
                let catalog = engine.catalog();
                for conflict in conflicts {
                    println!(
                        "  \"{}\" vs \"{}\": kept {}, ignored {}",
                        catalog.title(conflict.key.lo),
                        catalog.title(conflict.key.hi),
                        conflict.kept,
                        conflict.rejected
                    );
                }
            }
        }

        Commands::Render { out, dedup } => {
            let mut config = load()?;
            if dedup {
                config.render.dedup_edges = true;
            }
            let path = out.unwrap_or_else(|| config.render.path.clone());
            let engine = Engine::open(&config).into_diagnostic()?;
            for line in engine.legend() {
                println!("{line}");
            }
            engine.render_to_path(&path).into_diagnostic()?;
            println!("Wrote {}", path.display());
        }

        Commands::Sample {
            size,
            seed,
            dry_run,
        } => {
            let config = load()?;
            let size = size.unwrap_or(config.sampling.size);
            let seed = seed.unwrap_or(config.sampling.seed);
            let engine = Engine::open(&config).into_diagnostic()?;
            let outcome = engine.sample(size, seed);

            println!(
                "Candidates ({} of {} anchors, {} collisions):",
                outcome.candidates.len(),
                outcome.anchors.len(),
                outcome.collisions.len()
            );
            for pair in &outcome.candidates {
                println!("  {pair}");
            }

            if dry_run {
                println!("Dry run: log left unchanged.");
            } else {
                let written = engine
                    .append_candidates(&config.log.path, &outcome)
                    .into_diagnostic()?;
                println!("Appended {written} pending lines to {}", config.log.path.display());
            }
        }

        Commands::Coverage { limit } => {
            let config = load()?;
            let engine = Engine::open(&config).into_diagnostic()?;
            println!("Least covered ({limit}):");
            for (node, title, count) in engine.lowest_coverage(limit) {
                println!("  {count:>3}  {node}  {title}");
            }
        }

        Commands::Groups => {
            let config = load()?;
            let engine = Engine::open(&config).into_diagnostic()?;
            let groups = engine.merged_titles();
            if groups.is_empty() {
                println!("No merged items.");
            } else {
                println!("Merged groups ({}):", groups.len());
                for (root, titles) in &groups {
                    println!("  {root}: {}", titles.join(" = "));
                }
            }
        }

        Commands::Snapshot { action } => match action {
            SnapshotAction::Export { out } => {
                let config = load()?;
                let engine = Engine::open(&config).into_diagnostic()?;
                let snapshot = engine.snapshot();
                snapshot.save(&out).into_diagnostic()?;
                println!("Exported {} judgments to {}", snapshot.len(), out.display());
            }
            SnapshotAction::Check { file } => {
                let config = load()?;
                let snapshot = Snapshot::load(&file).into_diagnostic()?;
                let catalog = prefgraph::item::load_items_from_path(
                    &config.ratings.path,
                    &config.ratings,
                )
                .into_diagnostic()?;
                let judgments = snapshot.to_judgments(&catalog).into_diagnostic()?;
                println!(
                    "Snapshot {}: {} entries, {} pairs, {} conflicts",
                    file.display(),
                    snapshot.len(),
                    judgments.len(),
                    judgments.conflicts().len()
                );
            }
        },
    }

    Ok(())
}

/// Read the config file (defaults when absent) and apply the path overrides.
fn load_config(path: &Path, ratings: Option<PathBuf>, log: Option<PathBuf>) -> Result<Config> {
    let mut config = Config::load_or_default(path).into_diagnostic()?;
    if let Some(ratings) = ratings {
        config.ratings.path = ratings;
    }
    if let Some(log) = log {
        config.log.path = log;
    }
    Ok(config)
}
