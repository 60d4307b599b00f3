//! Lexical ranking by token coverage.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::models::{CandidateId, CatalogStore};
use crate::vocab::ProvidedFacts;

use super::{ranking_from_scores, RankError, Ranker, Ranking};

/// Ranks candidates by how much of each provided value's token set the
/// matching attribute column covers. Per-fact scores aggregate by sum,
/// the same rule as the other signals.
pub struct LexicalRanker {
    catalog: Arc<CatalogStore>,
}

impl LexicalRanker {
    pub fn new(catalog: Arc<CatalogStore>) -> Self {
        Self { catalog }
    }
}

impl Ranker for LexicalRanker {
    fn rank(&self, provided: &ProvidedFacts) -> Result<Ranking, RankError> {
        let mut scores: HashMap<CandidateId, f64> = HashMap::new();

        for (category, value) in provided {
            let query_tokens: BTreeSet<String> = tokenize(value).into_iter().collect();
            if query_tokens.is_empty() {
                continue;
            }

            for record in self.catalog.records() {
                let Some(text) = record.attribute(*category) else {
                    continue;
                };
                let text_tokens: BTreeSet<String> = tokenize(text).into_iter().collect();
                let matched = query_tokens.intersection(&text_tokens).count();
                if matched > 0 {
                    *scores.entry(record.id).or_default() +=
                        matched as f64 / query_tokens.len() as f64;
                }
            }
        }

        Ok(ranking_from_scores(scores.into_iter().collect()))
    }
}

/// Lowercase alphanumeric tokenization shared by the lexical ranker and
/// the hashed embedder.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CandidateRecord;
    use crate::vocab::FactCategory;

    fn catalog() -> Arc<CatalogStore> {
        Arc::new(CatalogStore::from_records(vec![
            CandidateRecord::new(1)
                .with(FactCategory::Name, "Panadol 500 mg")
                .with(FactCategory::Indications, "Meredakan demam dan sakit kepala"),
            CandidateRecord::new(2)
                .with(FactCategory::Name, "Bodrex Migra")
                .with(FactCategory::Indications, "Meredakan sakit kepala sebelah"),
            CandidateRecord::new(3).with(FactCategory::Name, "Panadol Extra"),
        ]))
    }

    #[test]
    fn tokenize_lowercases_and_splits() {
        assert_eq!(
            tokenize("Panadol 500 mg, Extra!"),
            vec!["panadol", "500", "mg", "extra"]
        );
    }

    #[test]
    fn name_query_ranks_matching_rows_only() {
        let ranker = LexicalRanker::new(catalog());
        let mut facts = ProvidedFacts::new();
        facts.insert(FactCategory::Name, "panadol".into());

        let ranking = ranker.rank(&facts).unwrap();
        let ids: Vec<_> = ranking.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![1, 3]); // full coverage for both, tie on id
        assert!(!ids.contains(&2));
    }

    #[test]
    fn coverage_rewards_fuller_matches() {
        let ranker = LexicalRanker::new(catalog());
        let mut facts = ProvidedFacts::new();
        facts.insert(FactCategory::Name, "panadol extra".into());

        let ranking = ranker.rank(&facts).unwrap();
        // Row 3 covers both query tokens, row 1 only one.
        assert_eq!(ranking[0].0, 3);
        assert_eq!(ranking[1].0, 1);
    }

    #[test]
    fn scores_sum_across_provided_facts() {
        let ranker = LexicalRanker::new(catalog());
        let mut facts = ProvidedFacts::new();
        facts.insert(FactCategory::Name, "panadol".into());
        facts.insert(FactCategory::Indications, "meredakan demam".into());

        let ranking = ranker.rank(&facts).unwrap();
        // Row 1 matches on both facts; row 2 only on indications.
        assert_eq!(ranking[0].0, 1);
        assert!(ranking.iter().any(|(id, _)| *id == 2));
    }

    #[test]
    fn rows_without_the_column_are_skipped() {
        let ranker = LexicalRanker::new(catalog());
        let mut facts = ProvidedFacts::new();
        facts.insert(FactCategory::Indications, "demam".into());

        let ranking = ranker.rank(&facts).unwrap();
        assert!(ranking.iter().all(|(id, _)| *id != 3));
    }
}
