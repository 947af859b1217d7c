//! The judgment log file: read it whole, append pending records.
//!
//! The log is append-only. Nothing here rewrites existing lines, and there is
//! no locking: concurrent runs appending to the same file may interleave.

use std::io::Write;
use std::path::Path;

use crate::error::LogError;
use crate::item::ItemCatalog;
use crate::judgment::{self, Anomaly, Judgment, JudgmentSet, LogResult};
use crate::sampler::CandidatePair;

/// A parsed and consolidated judgment log.
#[derive(Debug, Clone, Default)]
pub struct LoadedLog {
    pub judgments: JudgmentSet,
    /// Every record in file order, before consolidation.
    pub records: Vec<Judgment>,
    pub anomalies: Vec<Anomaly>,
}

/// Parse and consolidate log text.
pub fn read_judgments(text: &str, catalog: &ItemCatalog) -> LogResult<LoadedLog> {
    let parsed = judgment::parse_log(text, catalog)?;
    let judgments = JudgmentSet::from_records(&parsed.records);
    tracing::info!(
        records = parsed.records.len(),
        pairs = judgments.len(),
        anomalies = parsed.anomalies.len(),
        conflicts = judgments.conflicts().len(),
        "loaded judgments"
    );
    Ok(LoadedLog {
        judgments,
        records: parsed.records,
        anomalies: parsed.anomalies,
    })
}

/// Load the judgment log at `path`. A missing file is an empty log.
pub fn load_judgments(path: &Path, catalog: &ItemCatalog) -> LogResult<LoadedLog> {
    if !path.exists() {
        tracing::info!(path = %path.display(), "no judgment log yet");
        return Ok(LoadedLog::default());
    }
    let text = std::fs::read_to_string(path).map_err(|e| LogError::Read {
        path: path.display().to_string(),
        source: e,
    })?;
    read_judgments(&text, catalog)
}

/// Append one pending record per candidate. Returns the number of lines written.
///
/// Every line is formatted before the file is touched, so a title that cannot
/// be written leaves the log unchanged.
pub fn append_pending(path: &Path, candidates: &[CandidatePair]) -> LogResult<usize> {
    let lines = candidates
        .iter()
        .map(|pair| judgment::format_record(None, &pair.first, &pair.second))
        .collect::<LogResult<Vec<_>>>()?;
    if lines.is_empty() {
        return Ok(0);
    }

    let write_err = |e| LogError::Write {
        path: path.display().to_string(),
        source: e,
    };
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(write_err)?;
    let mut buf = String::new();
    for line in &lines {
        buf.push_str(line);
        buf.push('\n');
    }
    file.write_all(buf.as_bytes()).map_err(write_err)?;

    tracing::info!(path = %path.display(), count = lines.len(), "appended pending judgments");
    Ok(lines.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judgment::Relation;

    fn catalog() -> ItemCatalog {
        ItemCatalog::new([("Heat", None), ("Cube", None), ("Ronin", None)])
    }

    #[test]
    fn missing_log_is_empty() {
        let tmp = tempfile::TempDir::new().unwrap();
        let loaded = load_judgments(&tmp.path().join("state.txt"), &catalog()).unwrap();
        assert!(loaded.judgments.is_empty());
        assert!(loaded.anomalies.is_empty());
    }

    #[test]
    fn appended_lines_load_as_pending() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("state.txt");
        std::fs::write(&path, "<;Cube;Heat\n").unwrap();

        let written = append_pending(&path, &[CandidatePair::new("Ronin", "Heat")]).unwrap();
        assert_eq!(written, 1);

        let raw = std::fs::read_to_string(&path).unwrap();
        assert_eq!(raw, "<;Cube;Heat\n ;Heat;Ronin\n");

        let loaded = load_judgments(&path, &catalog()).unwrap();
        assert_eq!(loaded.records.len(), 2);
        assert_eq!(loaded.anomalies.len(), 1);
        assert_eq!(loaded.judgments.pending_count(), 1);
        assert_eq!(loaded.judgments.resolved().count(), 1);
        assert_eq!(loaded.records[0].relation, Some(Relation::Worse));
    }

    #[test]
    fn unwritable_title_leaves_log_untouched() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("state.txt");
        let err = append_pending(
            &path,
            &[
                CandidatePair::new("Heat", "Ronin"),
                CandidatePair::new("Heat", "Up; Down"),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, LogError::SeparatorInTitle { .. }));
        assert!(!path.exists());
    }
}
