use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tracing::warn;

use super::domain::{is_known_domain, CandidateDraft, CandidateId};
use super::report::{RegenerateError, RegenerationSummary, ReportRegenerator};
use super::store::{CandidateStore, StoreError};

/// Coordinates store mutations with report regeneration.
///
/// Every successful insert or delete synchronously triggers a full
/// regeneration pass before the call returns, so the artifacts never go
/// silently stale relative to the store. The mutation gate keeps at most one
/// mutate-and-regenerate sequence in flight and guarantees each pass reads a
/// state at least as new as its triggering mutation.
pub struct CandidateService<S> {
    store: Arc<S>,
    regenerator: ReportRegenerator<S>,
    mutation_gate: Mutex<()>,
}

impl<S: CandidateStore> CandidateService<S> {
    pub fn new(store: Arc<S>, output_dir: impl Into<PathBuf>) -> Self {
        let regenerator = ReportRegenerator::new(store.clone(), output_dir);
        Self {
            store,
            regenerator,
            mutation_gate: Mutex::new(()),
        }
    }

    /// Store one candidate and refresh the reports.
    pub fn submit(&self, draft: CandidateDraft) -> Result<CandidateId, ServiceError> {
        let _gate = self.mutation_gate.lock().expect("mutation gate poisoned");
        let id = self.store.insert(draft)?;
        self.refresh_reports();
        Ok(id)
    }

    /// Remove the given candidates and refresh the reports. Unknown ids are
    /// ignored; the returned count covers actual removals only.
    pub fn remove(&self, ids: &[CandidateId]) -> Result<usize, ServiceError> {
        let _gate = self.mutation_gate.lock().expect("mutation gate poisoned");
        let removed = self.store.delete(ids)?;
        self.refresh_reports();
        Ok(removed)
    }

    /// Run a regeneration pass outside of any mutation, surfacing its error.
    pub fn regenerate_reports(&self) -> Result<RegenerationSummary, RegenerateError> {
        let _gate = self.mutation_gate.lock().expect("mutation gate poisoned");
        self.regenerator.regenerate()
    }

    /// Where a known domain's artifact lives, if the domain is known at all.
    /// Download requests bypass the mutation gate and read the last pass.
    pub fn artifact_path(&self, domain: &str) -> Option<PathBuf> {
        is_known_domain(domain).then(|| self.regenerator.artifact_path(domain))
    }

    /// The mutation already committed when regeneration runs, so its failure
    /// is reported separately and never rolls the mutation back.
    fn refresh_reports(&self) {
        if let Err(err) = self.regenerator.regenerate() {
            warn!(error = %err, "report regeneration failed after committed mutation");
        }
    }
}

/// Error raised by candidate mutations. Regeneration failures are contained
/// inside the service and do not appear here.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),
}
