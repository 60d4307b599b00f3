//! Semantic ranking by embedding cosine similarity.
//!
//! Column embeddings are computed once at construction; only the query
//! values are embedded at rank time, one call per provided fact.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use thiserror::Error;

use crate::models::{CandidateId, CatalogStore};
use crate::vocab::{FactCategory, ProvidedFacts};

use super::{ranking_from_scores, tokenize, RankError, Ranker, Ranking};

/// Embedding provider errors.
#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("embedding provider error: {0}")]
    Provider(String),
}

/// Produces fixed-length vectors for attribute columns at initialization
/// and for arbitrary query strings on demand.
pub trait EmbeddingProvider: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

/// Ranks candidates by cosine similarity between the provided value's
/// embedding and the precomputed embedding of the matching attribute
/// column. Per-fact scores aggregate by sum, the same rule as the other
/// signals.
pub struct SemanticRanker {
    provider: Arc<dyn EmbeddingProvider>,
    columns: HashMap<(CandidateId, FactCategory), Vec<f32>>,
}

impl SemanticRanker {
    /// Embed every non-empty attribute cell of the catalog up front.
    pub fn new(
        catalog: Arc<CatalogStore>,
        provider: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self, EmbeddingError> {
        let mut columns = HashMap::new();
        for record in catalog.records() {
            for (category, text) in &record.attributes {
                columns.insert((record.id, *category), provider.embed(text)?);
            }
        }
        Ok(Self { provider, columns })
    }
}

impl Ranker for SemanticRanker {
    fn rank(&self, provided: &ProvidedFacts) -> Result<Ranking, RankError> {
        let mut scores: HashMap<CandidateId, f64> = HashMap::new();

        for (category, value) in provided {
            let query = self.provider.embed(value)?;
            for ((id, column_category), column) in &self.columns {
                if column_category == category {
                    let similarity = cosine(&query, column).max(0.0);
                    if similarity > 0.0 {
                        *scores.entry(*id).or_default() += similarity;
                    }
                }
            }
        }

        Ok(ranking_from_scores(scores.into_iter().collect()))
    }
}

/// Cosine similarity; 0.0 when either vector has no magnitude or the
/// dimensions disagree.
fn cosine(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b) {
        dot += (*x as f64) * (*y as f64);
        norm_a += (*x as f64) * (*x as f64);
        norm_b += (*y as f64) * (*y as f64);
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Deterministic bag-of-tokens embedder.
///
/// Hashes each token into a fixed-width bucket vector and L2-normalizes.
/// Good enough for offline runs and tests where a real sentence encoder
/// is not available.
pub struct HashedEmbedder {
    dims: usize,
}

impl HashedEmbedder {
    pub fn new(dims: usize) -> Self {
        Self { dims }
    }
}

impl Default for HashedEmbedder {
    fn default() -> Self {
        Self::new(256)
    }
}

impl EmbeddingProvider for HashedEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vector = vec![0.0f32; self.dims];
        for token in tokenize(text) {
            let mut hasher = DefaultHasher::new();
            token.hash(&mut hasher);
            let bucket = (hasher.finish() as usize) % self.dims;
            vector[bucket] += 1.0;
        }
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        Ok(vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CandidateRecord;

    fn catalog() -> Arc<CatalogStore> {
        Arc::new(CatalogStore::from_records(vec![
            CandidateRecord::new(1)
                .with(FactCategory::Name, "Panadol 500 mg")
                .with(FactCategory::Indications, "Meredakan demam dan sakit kepala"),
            CandidateRecord::new(2)
                .with(FactCategory::Name, "Bodrex Migra")
                .with(FactCategory::Indications, "Meredakan sakit kepala sebelah"),
        ]))
    }

    #[test]
    fn hashed_embedder_is_deterministic() {
        let embedder = HashedEmbedder::default();
        assert_eq!(
            embedder.embed("panadol 500").unwrap(),
            embedder.embed("panadol 500").unwrap()
        );
    }

    #[test]
    fn cosine_of_identical_text_is_one() {
        let embedder = HashedEmbedder::default();
        let a = embedder.embed("meredakan demam").unwrap();
        let b = embedder.embed("meredakan demam").unwrap();
        assert!((cosine(&a, &b) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn disjoint_token_sets_score_zero() {
        let embedder = HashedEmbedder::default();
        let a = embedder.embed("panadol").unwrap();
        let b = embedder.embed("bodrex").unwrap();
        assert_eq!(cosine(&a, &b), 0.0);
    }

    #[test]
    fn shared_tokens_rank_the_closer_row_first() {
        let ranker =
            SemanticRanker::new(catalog(), Arc::new(HashedEmbedder::default())).unwrap();
        let mut facts = ProvidedFacts::new();
        facts.insert(FactCategory::Indications, "meredakan demam".into());

        let ranking = ranker.rank(&facts).unwrap();
        assert_eq!(ranking[0].0, 1);
        // Row 2 still shares "meredakan" so it is ranked, below row 1.
        assert_eq!(ranking[1].0, 2);
    }

    #[test]
    fn unmatched_query_yields_empty_ranking() {
        let ranker =
            SemanticRanker::new(catalog(), Arc::new(HashedEmbedder::default())).unwrap();
        let mut facts = ProvidedFacts::new();
        facts.insert(FactCategory::Name, "zzz".into());

        assert!(ranker.rank(&facts).unwrap().is_empty());
    }
}
