//! Tier assignment for one domain group.
//!
//! Pure and deterministic: the same group in the same scan order always
//! produces the same ranking.

use super::domain::{CandidateRecord, Tier};

/// One ranked row: the stored candidate plus its computed tier.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCandidate {
    pub candidate: CandidateRecord,
    pub tier: Tier,
}

/// Rank one domain group.
///
/// Sorts by final score descending with a stable sort, so candidates with
/// equal scores keep their scan order (insertion order). The top and middle
/// tier sizes are both `ceil(n / 3)`, computed independently; whatever
/// positions remain after `2 * ceil(n / 3)` fall into the third tier. For
/// small n the three tiers deliberately do not partition n evenly (n = 1 is
/// a lone Recommended, n = 2 is one Recommended and one Stand By).
pub fn rank_group(mut group: Vec<CandidateRecord>) -> Vec<RankedCandidate> {
    if group.is_empty() {
        return Vec::new();
    }

    group.sort_by(|a, b| b.ranking_score().total_cmp(&a.ranking_score()));

    let n = group.len();
    let top_count = n.div_ceil(3);
    let mid_count = n.div_ceil(3);

    group
        .into_iter()
        .enumerate()
        .map(|(position, candidate)| {
            let tier = if position < top_count {
                Tier::Recommended
            } else if position < top_count + mid_count {
                Tier::StandBy
            } else {
                Tier::NotRecommended
            };
            RankedCandidate { candidate, tier }
        })
        .collect()
}
