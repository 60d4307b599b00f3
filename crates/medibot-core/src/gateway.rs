//! Fact extraction gateway.
//!
//! Wraps the external language model behind the four fixed prompts. Facts
//! cross the model boundary under localized labels and live internally as
//! canonical categories; conversion goes through the vocabulary in both
//! directions, so ranking logic never sees prompt phrasing. Labels the
//! vocabulary does not know are dropped silently.

use medibot_llm::{
    extraction::{parse_extraction, parse_revision, ExtractionError, FactSheet},
    prompts, LanguageModel, LlmError,
};
use thiserror::Error;

use crate::retrieval::Document;
use crate::vocab::{localize_facts, DesiredFacts, FactCategory, ProvidedFacts};

/// Gateway errors.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("model call failed: {0}")]
    Model(#[from] LlmError),

    #[error("fact extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("could not serialize facts for the revision prompt: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// The engine's single door to the language model.
pub struct FactGateway<M: LanguageModel> {
    model: M,
}

impl<M: LanguageModel> FactGateway<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    /// Extract desired and provided facts from a user query.
    pub fn extract_facts(
        &self,
        query: &str,
    ) -> Result<(DesiredFacts, ProvidedFacts), GatewayError> {
        let response = self
            .model
            .complete(prompts::EXTRACTION_SYSTEM_PROMPT, query)?;
        let sheet = parse_extraction(&response)?;
        Ok(canonicalize(sheet))
    }

    /// Revise provided facts from the user's correction text. The model
    /// decides per mentioned fact whether the label or the value was
    /// wrong and returns the fully merged corrected map.
    pub fn revise_facts(
        &self,
        provided: &ProvidedFacts,
        revision: &str,
    ) -> Result<ProvidedFacts, GatewayError> {
        let current = serde_json::to_string(&localize_facts(provided))?;
        let user = prompts::make_revision_prompt(&current, revision);
        let response = self.model.complete(prompts::REVISION_SYSTEM_PROMPT, &user)?;
        let sheet = parse_revision(&response)?;
        let (_, provided) = canonicalize(sheet);
        Ok(provided)
    }

    /// Is this text a medical question? Affirmative only on a literal
    /// yes; anything else, including noise, is negative and never an
    /// error.
    pub fn classify_intent(&self, text: &str) -> Result<bool, GatewayError> {
        let response = self
            .model
            .complete(prompts::INTENT_SYSTEM_PROMPT, &prompts::make_intent_prompt(text))?;
        let verdict = response.trim().to_lowercase();
        Ok(verdict == "yes" || verdict == "ya")
    }

    /// Synthesize an answer from the retrieved documents.
    pub fn generate_answer(
        &self,
        question: &str,
        documents: &[Document],
    ) -> Result<String, GatewayError> {
        let context = documents
            .iter()
            .map(|d| d.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let user = prompts::make_generation_prompt(&context, question);
        Ok(self
            .model
            .complete(prompts::GENERATION_SYSTEM_PROMPT, &user)?)
    }
}

/// Convert a labeled fact sheet into canonical categories, dropping
/// unknown labels.
fn canonicalize(sheet: FactSheet) -> (DesiredFacts, ProvidedFacts) {
    let desired: DesiredFacts = sheet
        .desired
        .unwrap_or_default()
        .iter()
        .filter_map(|label| FactCategory::from_label(label))
        .collect();

    let provided: ProvidedFacts = sheet
        .provided
        .into_iter()
        .filter_map(|(label, value)| {
            FactCategory::from_label(&label).map(|category| (category, value))
        })
        .collect();

    (desired, provided)
}

#[cfg(test)]
mod tests {
    use super::*;
    use medibot_llm::ScriptedModel;

    #[test]
    fn extract_facts_converts_labels_to_categories() {
        let model = ScriptedModel::new([concat!(
            "Step by step reasoning here.\n",
            r#"{"Desired fact": ["Side Effects"], "Fact provided": {"Drug Name": "panadol", "General Indications": "meredakan demam"}}"#
        )]);
        let gateway = FactGateway::new(model);

        let (desired, provided) = gateway.extract_facts("efek samping panadol?").unwrap();
        assert_eq!(desired, vec![FactCategory::SideEffects]);
        assert_eq!(provided[&FactCategory::Name], "panadol");
        assert_eq!(provided[&FactCategory::Indications], "meredakan demam");
    }

    #[test]
    fn unknown_labels_are_dropped_silently() {
        let model = ScriptedModel::new([
            r#"{"Desired fact": ["Side Effects", "Price"], "Fact provided": {"Drug Name": "panadol", "Harga": "5000"}}"#,
        ]);
        let gateway = FactGateway::new(model);

        let (desired, provided) = gateway.extract_facts("q").unwrap();
        assert_eq!(desired, vec![FactCategory::SideEffects]);
        assert_eq!(provided.len(), 1);
        assert!(provided.contains_key(&FactCategory::Name));
    }

    #[test]
    fn garbled_extraction_is_a_gateway_error() {
        let gateway = FactGateway::new(ScriptedModel::new(["no object here"]));
        assert!(matches!(
            gateway.extract_facts("q"),
            Err(GatewayError::Extraction(ExtractionError::MissingObject))
        ));
    }

    #[test]
    fn revise_facts_returns_the_merged_map() {
        let model = ScriptedModel::new([
            r#"{"Fact provided": {"Drug Name": "paracetamol", "Contraindications": "tidak untuk hypersensitivitas"}}"#,
        ]);
        let gateway = FactGateway::new(model);

        let mut current = ProvidedFacts::new();
        current.insert(FactCategory::Name, "panadol".into());
        current.insert(FactCategory::Indications, "untuk hypersensitivitas".into());

        let revised = gateway
            .revise_facts(&current, "namanya paracetamol dan itu kontraindikasi")
            .unwrap();
        assert_eq!(revised[&FactCategory::Name], "paracetamol");
        assert!(revised.contains_key(&FactCategory::Contraindications));
        assert!(!revised.contains_key(&FactCategory::Indications));
    }

    #[test]
    fn intent_accepts_yes_and_ya_only() {
        let gateway = FactGateway::new(ScriptedModel::new(["yes", " Ya \n", "no", "maybe?"]));
        assert!(gateway.classify_intent("q").unwrap());
        assert!(gateway.classify_intent("q").unwrap());
        assert!(!gateway.classify_intent("q").unwrap());
        assert!(!gateway.classify_intent("q").unwrap());
    }

    #[test]
    fn generate_answer_passes_joined_context() {
        let gateway = FactGateway::new(ScriptedModel::new(["Panadol aman diminum."]));
        let documents = vec![
            Document {
                candidate_id: 1,
                content: "Drug Name: Panadol".into(),
            },
            Document {
                candidate_id: 2,
                content: "Drug Name: Bodrex".into(),
            },
        ];

        let answer = gateway.generate_answer("aman?", &documents).unwrap();
        assert_eq!(answer, "Panadol aman diminum.");
    }
}
