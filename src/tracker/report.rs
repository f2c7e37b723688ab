//! Full rebuild of the per-domain report artifacts.
//!
//! Every pass starts from a fresh scan of the store, clears the output
//! directory, and rewrites one CSV per known domain with candidates. A
//! failure to write one domain's artifact is logged and skipped; the other
//! domains are still produced.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use super::domain::{artifact_file_name, CandidateRecord, KNOWN_DOMAINS};
use super::ranking::{rank_group, RankedCandidate};
use super::store::{CandidateStore, StoreError};

/// Artifact column order. "Remarks" carries the computed tier label.
const ARTIFACT_COLUMNS: [&str; 12] = [
    "ID",
    "Name",
    "University",
    "CGPA",
    "Domain",
    "Experience",
    "Test Score",
    "Weighted Test",
    "Avg Interview Raw",
    "Weighted Interview Score",
    "Final Score",
    "Remarks",
];

/// Error raised when a regeneration pass aborts entirely. Per-domain write
/// failures are contained and never surface here.
#[derive(Debug, thiserror::Error)]
pub enum RegenerateError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("could not prepare report directory {path}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Counters describing one completed regeneration pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegenerationSummary {
    pub candidates: usize,
    pub artifacts_written: usize,
    pub artifacts_failed: usize,
}

/// Rebuilds every domain artifact from a full store scan.
pub struct ReportRegenerator<S> {
    store: Arc<S>,
    output_dir: PathBuf,
}

impl<S: CandidateStore> ReportRegenerator<S> {
    pub fn new(store: Arc<S>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path a domain's artifact is written to. Existence is not implied.
    pub fn artifact_path(&self, domain: &str) -> PathBuf {
        self.output_dir.join(artifact_file_name(domain))
    }

    /// Run one full pass: scan, clear, rank, rewrite.
    ///
    /// A store failure aborts the pass before any artifact is touched, so a
    /// partial scan can never produce partial reports.
    pub fn regenerate(&self) -> Result<RegenerationSummary, RegenerateError> {
        let records = self.store.scan_all()?;

        fs::create_dir_all(&self.output_dir).map_err(|source| RegenerateError::OutputDir {
            path: self.output_dir.clone(),
            source,
        })?;
        self.clear_artifacts();

        if records.is_empty() {
            return Ok(RegenerationSummary::default());
        }

        let candidates = records.len();
        let mut groups: HashMap<String, Vec<CandidateRecord>> = HashMap::new();
        for record in records {
            groups
                .entry(record.domain_key().to_string())
                .or_default()
                .push(record);
        }

        // Every group is ranked, including ones whose domain is not in the
        // known set; only the known domains are written out below.
        let mut ranked_groups: HashMap<String, Vec<RankedCandidate>> = groups
            .into_iter()
            .map(|(domain, group)| (domain, rank_group(group)))
            .collect();

        let mut artifacts_written = 0;
        let mut artifacts_failed = 0;
        for domain in KNOWN_DOMAINS {
            let Some(ranked) = ranked_groups.remove(domain) else {
                continue;
            };
            match self.write_artifact(domain, &ranked) {
                Ok(()) => artifacts_written += 1,
                Err(err) => {
                    warn!(%domain, error = %err, "skipping domain report after write failure");
                    artifacts_failed += 1;
                }
            }
        }

        let summary = RegenerationSummary {
            candidates,
            artifacts_written,
            artifacts_failed,
        };
        debug!(
            candidates = summary.candidates,
            written = summary.artifacts_written,
            failed = summary.artifacts_failed,
            "report regeneration pass complete"
        );
        Ok(summary)
    }

    /// Remove every artifact currently in the output directory, so nothing
    /// from a superseded candidate set or domain spelling survives a pass.
    fn clear_artifacts(&self) {
        let entries = match fs::read_dir(&self.output_dir) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(path = %self.output_dir.display(), error = %err, "could not list report directory for clearing");
                return;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("csv") {
                continue;
            }
            if let Err(err) = fs::remove_file(&path) {
                warn!(path = %path.display(), error = %err, "could not remove stale report artifact");
            }
        }
    }

    fn write_artifact(&self, domain: &str, ranked: &[RankedCandidate]) -> Result<(), csv::Error> {
        let mut writer = csv::Writer::from_path(self.artifact_path(domain))?;
        writer.write_record(ARTIFACT_COLUMNS)?;
        for row in ranked {
            let candidate = &row.candidate;
            writer.write_record([
                candidate.id.to_string(),
                text(&candidate.name),
                text(&candidate.university),
                number(candidate.cgpa),
                candidate.domain_key().to_string(),
                text(&candidate.experience),
                number(candidate.test_score),
                number(candidate.weighted_test),
                number(candidate.avg_interview_raw),
                number(candidate.avg_interview_weighted),
                candidate.ranking_score().to_string(),
                row.tier.label().to_string(),
            ])?;
        }
        writer.flush()?;
        Ok(())
    }
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn number(value: Option<f64>) -> String {
    value.map(|number| number.to_string()).unwrap_or_default()
}
