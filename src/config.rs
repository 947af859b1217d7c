//! Run configuration, persisted as TOML.
//!
//! Every field has a serde default, so a missing file or a partial file both
//! produce a usable [`Config`]. The defaults describe the usual layout of a
//! project directory: `ratings.csv`, `state.txt` and `graph.dot` side by side.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::coverage::CoveragePolicy;
use crate::error::ConfigError;

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "prefgraph.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ratings: RatingsConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub sampling: SamplingConfig,
    #[serde(default)]
    pub coverage: CoveragePolicy,
    #[serde(default)]
    pub render: RenderConfig,
}

/// Where the items come from and which CSV columns to read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingsConfig {
    #[serde(default = "default_ratings_path")]
    pub path: PathBuf,
    #[serde(default = "default_title_column")]
    pub title_column: String,
    #[serde(default = "default_rating_column")]
    pub rating_column: String,
}

fn default_ratings_path() -> PathBuf {
    PathBuf::from("ratings.csv")
}
fn default_title_column() -> String {
    "Title".into()
}
fn default_rating_column() -> String {
    "You rated".into()
}

impl Default for RatingsConfig {
    fn default() -> Self {
        Self {
            path: default_ratings_path(),
            title_column: default_title_column(),
            rating_column: default_rating_column(),
        }
    }
}

/// Location of the append-only judgment log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_path")]
    pub path: PathBuf,
}

fn default_log_path() -> PathBuf {
    PathBuf::from("state.txt")
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            path: default_log_path(),
        }
    }
}

/// Defaults for `prefgraph sample`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Number of lowest-coverage items used as anchors.
    #[serde(default = "default_sample_size")]
    pub size: usize,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_sample_size() -> usize {
    15
}
fn default_seed() -> u64 {
    4_362_376_737
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            size: default_sample_size(),
            seed: default_seed(),
        }
    }
}

/// What to print inside each DOT node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeLabel {
    /// The `n{ordinal}` node id (pair it with the printed legend).
    Id,
    /// The item title.
    Title,
}

/// Graphviz output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_render_path")]
    pub path: PathBuf,
    #[serde(default = "default_graph_name")]
    pub name: String,
    #[serde(default = "default_rankdir")]
    pub rankdir: String,
    #[serde(default = "default_size")]
    pub size: String,
    #[serde(default = "default_dpi")]
    pub dpi: u32,
    #[serde(default = "default_ratio")]
    pub ratio: String,
    #[serde(default = "default_label")]
    pub label: NodeLabel,
    /// Collapse repeated edges between the same pair before rendering.
    #[serde(default)]
    pub dedup_edges: bool,
    #[serde(default = "default_fallback_color")]
    pub fallback_color: String,
    /// Rating label → fill color.
    #[serde(default = "default_colors")]
    pub colors: BTreeMap<String, String>,
}

fn default_render_path() -> PathBuf {
    PathBuf::from("graph.dot")
}
fn default_graph_name() -> String {
    "test".into()
}
fn default_rankdir() -> String {
    "BT".into()
}
fn default_size() -> String {
    "20, 5".into()
}
fn default_dpi() -> u32 {
    500
}
fn default_ratio() -> String {
    "fill".into()
}
fn default_label() -> NodeLabel {
    NodeLabel::Id
}
fn default_fallback_color() -> String {
    "white".into()
}
fn default_colors() -> BTreeMap<String, String> {
    [("10", "red"), ("9", "green"), ("8", "blue"), ("7", "yellow")]
        .into_iter()
        .map(|(rating, color)| (rating.to_string(), color.to_string()))
        .collect()
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            path: default_render_path(),
            name: default_graph_name(),
            rankdir: default_rankdir(),
            size: default_size(),
            dpi: default_dpi(),
            ratio: default_ratio(),
            label: default_label(),
            dedup_edges: false,
            fallback_color: default_fallback_color(),
            colors: default_colors(),
        }
    }
}

impl Config {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Load from a TOML file, falling back to defaults when it does not exist.
    pub fn load_or_default(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Save to a TOML file.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }
}
