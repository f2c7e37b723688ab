use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier assigned by the candidate store. Monotonically increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CandidateId(pub u64);

impl std::fmt::Display for CandidateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// The hiring domains reports are produced for. Order drives artifact discovery.
pub const KNOWN_DOMAINS: [&str; 8] = [
    "EMBEDDED",
    "FPGA",
    "RTOS",
    "RF",
    "WIRELESS",
    "SYSTEM ENGG",
    "COMM AND DSP",
    "CORRELATION AND FUSION",
];

pub fn is_known_domain(domain: &str) -> bool {
    KNOWN_DOMAINS.contains(&domain)
}

/// File name of a domain's report artifact. Spaces become underscores.
pub fn artifact_file_name(domain: &str) -> String {
    format!("{}.csv", domain.replace(' ', "_"))
}

/// Loosely-typed submission payload.
///
/// Every field is optional and unknown fields are ignored; a submission is
/// never rejected for missing data. Field names follow the intake form's
/// JSON keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateDraft {
    pub name: Option<String>,
    pub university: Option<String>,
    pub cgpa: Option<f64>,
    pub domain: Option<String>,
    pub experience: Option<String>,
    pub test_score: Option<f64>,
    pub weighted_test: Option<f64>,
    pub avg_interview_raw: Option<f64>,
    pub avg_interview_weighted: Option<f64>,
    pub final_score: Option<f64>,
    pub remarks: Option<String>,
}

/// A stored candidate. Storage keeps raw absences; default substitution for
/// ranking and export happens at that boundary, never here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub id: CandidateId,
    pub submitted_at: DateTime<Utc>,
    pub name: Option<String>,
    pub university: Option<String>,
    pub cgpa: Option<f64>,
    pub domain: Option<String>,
    pub experience: Option<String>,
    pub test_score: Option<f64>,
    pub weighted_test: Option<f64>,
    pub avg_interview_raw: Option<f64>,
    pub avg_interview_weighted: Option<f64>,
    pub final_score: Option<f64>,
    pub remarks: Option<String>,
}

impl CandidateRecord {
    pub fn from_draft(id: CandidateId, submitted_at: DateTime<Utc>, draft: CandidateDraft) -> Self {
        Self {
            id,
            submitted_at,
            name: draft.name,
            university: draft.university,
            cgpa: draft.cgpa,
            domain: draft.domain,
            experience: draft.experience,
            test_score: draft.test_score,
            weighted_test: draft.weighted_test,
            avg_interview_raw: draft.avg_interview_raw,
            avg_interview_weighted: draft.avg_interview_weighted,
            final_score: draft.final_score,
            remarks: draft.remarks,
        }
    }

    /// Ranking key. An absent final score always ranks as 0.0.
    pub fn ranking_score(&self) -> f64 {
        self.final_score.unwrap_or(0.0)
    }

    /// Grouping key. An absent domain groups under the empty string, which
    /// is never part of the known set and therefore never exported.
    pub fn domain_key(&self) -> &str {
        self.domain.as_deref().unwrap_or("")
    }
}

/// Tier assigned by the ranking engine within one domain group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    Recommended,
    StandBy,
    NotRecommended,
}

impl Tier {
    /// Label written to the artifact's Remarks column.
    pub const fn label(self) -> &'static str {
        match self {
            Tier::Recommended => "Recommended",
            Tier::StandBy => "Stand By",
            Tier::NotRecommended => "Not Recommended",
        }
    }
}
