//! Character-similarity ranking.
//!
//! Jaro-Winkler between the provided value and the attribute text, meant
//! for near-exact fields such as the product name where typo and
//! transliteration tolerance beats token or embedding matching.

use std::collections::HashMap;
use std::sync::Arc;

use strsim::jaro_winkler;

use crate::models::{CandidateId, CatalogStore};
use crate::vocab::ProvidedFacts;

use super::{ranking_from_scores, RankError, Ranker, Ranking};

pub struct FuzzyRanker {
    catalog: Arc<CatalogStore>,
}

impl FuzzyRanker {
    pub fn new(catalog: Arc<CatalogStore>) -> Self {
        Self { catalog }
    }
}

impl Ranker for FuzzyRanker {
    fn rank(&self, provided: &ProvidedFacts) -> Result<Ranking, RankError> {
        let mut scores: HashMap<CandidateId, f64> = HashMap::new();

        for (category, value) in provided {
            let query = value.to_lowercase();
            for record in self.catalog.records() {
                let Some(text) = record.attribute(*category) else {
                    continue;
                };
                let similarity = jaro_winkler(&query, &text.to_lowercase());
                if similarity > 0.0 {
                    *scores.entry(record.id).or_default() += similarity;
                }
            }
        }

        Ok(ranking_from_scores(scores.into_iter().collect()))
    }
}
