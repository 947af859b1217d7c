//! Rich diagnostic error types for prefgraph.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text. Only fatal conditions live here:
//! anomalies that a run survives (unknown relation symbols, conflicting
//! re-registrations, sampling collisions) are reported as plain values instead.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for prefgraph.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text, sources) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum PrefError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Item(#[from] ItemError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Log(#[from] LogError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Render(#[from] RenderError),
}

// ---------------------------------------------------------------------------
// Item errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ItemError {
    #[error("failed to read ratings file: {path}")]
    #[diagnostic(
        code(prefgraph::item::read),
        help("Check that the ratings export exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed ratings CSV: {message}")]
    #[diagnostic(
        code(prefgraph::item::csv),
        help(
            "The ratings file must be a CSV export with a header row. \
             Re-export it or fix the offending row."
        )
    )]
    Csv { message: String },

    #[error("ratings file has no \"{column}\" column")]
    #[diagnostic(
        code(prefgraph::item::missing_column),
        help(
            "Set `ratings.title_column` in the config to the header that holds \
             the item titles."
        )
    )]
    MissingColumn { column: String },

    #[error("unknown title: \"{title}\"")]
    #[diagnostic(
        code(prefgraph::item::unknown_title),
        help("Titles are matched exactly (case-sensitive) against the ratings file.")
    )]
    UnknownTitle { title: String },
}

// ---------------------------------------------------------------------------
// Judgment log errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum LogError {
    #[error("failed to read judgment log: {path}")]
    #[diagnostic(
        code(prefgraph::log::read),
        help("Check that the judgment log is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to append to judgment log: {path}")]
    #[diagnostic(
        code(prefgraph::log::write),
        help("Ensure you have write permissions to the judgment log.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: expected `relation ; subject ; object`, got \"{content}\"")]
    #[diagnostic(
        code(prefgraph::log::malformed),
        help("Every non-empty line needs exactly three `;`-separated fields.")
    )]
    Malformed { line: usize, content: String },

    #[error("line {line}: title \"{title}\" is not in the ratings file")]
    #[diagnostic(
        code(prefgraph::log::unknown_title),
        help(
            "Item identity comes from the ratings file. Fix the title in the log \
             or re-export the ratings so it includes this item."
        )
    )]
    UnknownTitle { line: usize, title: String },

    #[error("title \"{title}\" contains the `;` field separator")]
    #[diagnostic(
        code(prefgraph::log::separator_in_title),
        help(
            "The judgment log cannot represent this title unambiguously. \
             Judge this pair by hand or export a snapshot instead."
        )
    )]
    SeparatorInTitle { title: String },
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(prefgraph::config::read),
        help("Ensure the config file exists and is valid TOML.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {path}: {message}")]
    #[diagnostic(
        code(prefgraph::config::parse),
        help("Check the TOML syntax in the config file.")
    )]
    Parse { path: String, message: String },

    #[error("failed to write config: {path}")]
    #[diagnostic(
        code(prefgraph::config::write),
        help("Ensure you have write permissions to the config directory.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Snapshot errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum SnapshotError {
    #[error("failed to read snapshot: {path}")]
    #[diagnostic(code(prefgraph::snapshot::read))]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write snapshot: {path}")]
    #[diagnostic(
        code(prefgraph::snapshot::write),
        help("Ensure the output directory exists and is writable.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot serialization error: {message}")]
    #[diagnostic(
        code(prefgraph::snapshot::serde),
        help("The snapshot must be a JSON document with an `entries` array.")
    )]
    Serialization { message: String },
}

// ---------------------------------------------------------------------------
// Render errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum RenderError {
    #[error("failed to write graph: {path}")]
    #[diagnostic(
        code(prefgraph::render::write),
        help("Ensure the output directory exists and is writable.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience alias for functions returning prefgraph results.
pub type PrefResult<T> = std::result::Result<T, PrefError>;
