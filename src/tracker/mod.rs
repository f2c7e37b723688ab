//! Candidate intake, ranking, and report regeneration.
//!
//! The store, ranking engine, and report regenerator are deliberately
//! separated so each can be exercised on its own: the ranking engine is a
//! pure function over one domain group, the regenerator only consumes the
//! store trait, and the service is the single place that couples a mutation
//! to a regeneration pass.

pub mod domain;
pub mod ranking;
pub mod report;
pub mod router;
pub mod service;
pub mod store;

pub use domain::{
    artifact_file_name, is_known_domain, CandidateDraft, CandidateId, CandidateRecord, Tier,
    KNOWN_DOMAINS,
};
pub use ranking::{rank_group, RankedCandidate};
pub use report::{RegenerateError, RegenerationSummary, ReportRegenerator};
pub use router::{tracker_router, TrackerState};
pub use service::{CandidateService, ServiceError};
pub use store::{CandidateStore, JsonlCandidateStore, StoreError};
