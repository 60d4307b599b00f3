//! Per-candidate ranking signals and their fusion.
//!
//! Three independent signals score every candidate against the provided
//! facts: token overlap ([`LexicalRanker`]), embedding cosine similarity
//! ([`SemanticRanker`]), and character similarity ([`FuzzyRanker`]). Each
//! returns a ranking over the candidates it could score at all; fusion
//! inner-joins them so a surviving candidate is corroborated by every
//! signal.

pub mod fusion;
mod fuzzy;
mod lexical;
mod semantic;

pub use fusion::{fuse, FusionError, RRF_K};
pub use fuzzy::FuzzyRanker;
pub use lexical::{tokenize, LexicalRanker};
pub use semantic::{EmbeddingError, EmbeddingProvider, HashedEmbedder, SemanticRanker};

use thiserror::Error;

use crate::models::CandidateId;
use crate::vocab::ProvidedFacts;

/// Ordered (candidate id, 1-based rank position) pairs.
pub type Ranking = Vec<(CandidateId, usize)>;

/// Ranking errors. Only the semantic signal can fail (its embedding
/// provider is an external call).
#[derive(Error, Debug)]
pub enum RankError {
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
}

/// One ranking signal over the full candidate universe.
pub trait Ranker {
    fn rank(&self, provided: &ProvidedFacts) -> Result<Ranking, RankError>;
}

/// Turn raw per-candidate scores into a ranking.
///
/// Zero-score candidates are omitted; the rest sort by score descending
/// with ties broken by ascending candidate id, then get ranks 1..n. Every
/// ranker funnels through here so aggregation and tie-breaking stay
/// identical across signals.
pub(crate) fn ranking_from_scores(mut scores: Vec<(CandidateId, f64)>) -> Ranking {
    scores.retain(|(_, score)| *score > 0.0);
    scores.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    scores
        .into_iter()
        .enumerate()
        .map(|(index, (id, _))| (id, index + 1))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scores_become_one_based_ranks() {
        let ranking = ranking_from_scores(vec![(1, 0.2), (2, 0.9), (3, 0.5)]);
        assert_eq!(ranking, vec![(2, 1), (3, 2), (1, 3)]);
    }

    #[test]
    fn zero_scores_are_omitted() {
        let ranking = ranking_from_scores(vec![(1, 0.0), (2, 0.4)]);
        assert_eq!(ranking, vec![(2, 1)]);
    }

    #[test]
    fn ties_break_by_candidate_id() {
        let ranking = ranking_from_scores(vec![(9, 0.5), (3, 0.5), (7, 0.5)]);
        assert_eq!(ranking, vec![(3, 1), (7, 2), (9, 3)]);
    }
}
