//! Reciprocal rank fusion: fused score = Σ 1/(k + rank).
//!
//! Strict inner join over the supplied rankings. A candidate missing from
//! any one signal is excluded; multi-signal corroboration is required.

use std::collections::HashMap;

use thiserror::Error;

use crate::models::CandidateId;

use super::Ranking;

/// Default smoothing constant. Higher k flattens the influence of top
/// ranks from any single signal.
pub const RRF_K: f64 = 60.0;

/// Fusion errors.
#[derive(Error, Debug)]
pub enum FusionError {
    #[error("no candidate is present in every ranking")]
    EmptyIntersection,
}

/// Fuse rankings into one (candidate id, fused score) ordering, best
/// first. Larger fused score is better; ties break by ascending id, so
/// the result is deterministic and invariant to the order of the input
/// rankings.
pub fn fuse(rankings: &[Ranking], k: f64) -> Result<Vec<(CandidateId, f64)>, FusionError> {
    if rankings.is_empty() {
        return Err(FusionError::EmptyIntersection);
    }

    let mut joined: HashMap<CandidateId, (usize, f64)> = HashMap::new();
    for ranking in rankings {
        for (id, rank) in ranking {
            let entry = joined.entry(*id).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += 1.0 / (k + *rank as f64);
        }
    }

    let mut fused: Vec<(CandidateId, f64)> = joined
        .into_iter()
        .filter(|(_, (seen, _))| *seen == rankings.len())
        .map(|(id, (_, score))| (id, score))
        .collect();

    if fused.is_empty() {
        return Err(FusionError::EmptyIntersection);
    }

    fused.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });

    Ok(fused)
}
