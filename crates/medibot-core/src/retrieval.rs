//! Hybrid retrieval: three ranking signals, reciprocal rank fusion, and
//! document rendering for the generation prompt.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{CandidateRecord, CatalogStore};
use crate::rank::{
    fuse, EmbeddingError, EmbeddingProvider, FuzzyRanker, LexicalRanker, RankError, Ranker,
    SemanticRanker, RRF_K,
};
use crate::vocab::{FactCategory, ProvidedFacts};

/// Retrieval depth used by the dialogue engine.
pub const DEFAULT_TOP_K: usize = 10;

/// Retrieval errors.
#[derive(Error, Debug)]
pub enum RetrievalError {
    /// The fusion inner join came back empty: no candidate was
    /// corroborated by all three signals.
    #[error("no candidate matched every ranking signal")]
    NoMatch,

    #[error(transparent)]
    Rank(#[from] RankError),
}

/// One retrieved candidate rendered for the generation prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub candidate_id: i64,
    pub content: String,
}

/// Composes the three rankers and fusion into a top-k document result.
pub struct HybridRetriever {
    catalog: Arc<CatalogStore>,
    lexical: LexicalRanker,
    semantic: SemanticRanker,
    fuzzy: FuzzyRanker,
}

impl HybridRetriever {
    /// Build the retriever, precomputing column embeddings.
    pub fn new(
        catalog: Arc<CatalogStore>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self, EmbeddingError> {
        let semantic = SemanticRanker::new(Arc::clone(&catalog), embedder)?;
        Ok(Self {
            lexical: LexicalRanker::new(Arc::clone(&catalog)),
            fuzzy: FuzzyRanker::new(Arc::clone(&catalog)),
            semantic,
            catalog,
        })
    }

    /// Run all three signals, fuse, and render the top-k survivors.
    ///
    /// Fewer than k survivors yields a shorter (possibly empty after
    /// slicing) result; an empty inner join is [`RetrievalError::NoMatch`].
    pub fn retrieve(
        &self,
        provided: &ProvidedFacts,
        k: usize,
    ) -> Result<Vec<Document>, RetrievalError> {
        let rankings = vec![
            self.lexical.rank(provided)?,
            self.semantic.rank(provided)?,
            self.fuzzy.rank(provided)?,
        ];

        let fused = fuse(&rankings, RRF_K).map_err(|_| RetrievalError::NoMatch)?;
        tracing::debug!(survivors = fused.len(), k, "rank fusion complete");

        Ok(fused
            .into_iter()
            .take(k)
            .filter_map(|(id, _)| self.catalog.get(id))
            .map(render_document)
            .collect())
    }
}

/// Render one candidate as "label: value" lines over its attribute
/// columns in vocabulary order. Bookkeeping fields (links, validity flag)
/// live outside the attribute map and never appear here.
fn render_document(record: &CandidateRecord) -> Document {
    let content = FactCategory::ALL
        .into_iter()
        .filter_map(|category| {
            record
                .attribute(category)
                .map(|value| format!("{}: {}", category.label(), value))
        })
        .collect::<Vec<_>>()
        .join("\n");

    Document {
        candidate_id: record.id,
        content,
    }
}
