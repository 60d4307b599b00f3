//! Fact vocabulary: the twelve canonical fact categories and their
//! localized labels.
//!
//! Categories are what the engine ranks and checkpoints with; labels are
//! what the external model reads and writes. The mapping is a bijection
//! over exactly these twelve entries. Anything outside the set is dropped
//! silently wherever it is used as a filter.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the twelve canonical fact categories a user can reference.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum FactCategory {
    Name,
    Instructions,
    Dosage,
    SideEffects,
    Category,
    Indications,
    Packaging,
    Composition,
    Contraindications,
    Manufacturer,
    Warning,
    Description,
}

/// Category → free-text value pairs extracted from user text.
pub type ProvidedFacts = BTreeMap<FactCategory, String>;

/// Categories the user wants answered; may be empty.
pub type DesiredFacts = Vec<FactCategory>;

impl FactCategory {
    /// All categories in canonical listing order.
    pub const ALL: [FactCategory; 12] = [
        FactCategory::Name,
        FactCategory::Instructions,
        FactCategory::Dosage,
        FactCategory::SideEffects,
        FactCategory::Category,
        FactCategory::Indications,
        FactCategory::Packaging,
        FactCategory::Composition,
        FactCategory::Contraindications,
        FactCategory::Manufacturer,
        FactCategory::Warning,
        FactCategory::Description,
    ];

    /// Canonical name used in serialized state.
    pub fn as_str(self) -> &'static str {
        match self {
            FactCategory::Name => "name",
            FactCategory::Instructions => "instructions",
            FactCategory::Dosage => "dosage",
            FactCategory::SideEffects => "side-effects",
            FactCategory::Category => "category",
            FactCategory::Indications => "indications",
            FactCategory::Packaging => "packaging",
            FactCategory::Composition => "composition",
            FactCategory::Contraindications => "contraindications",
            FactCategory::Manufacturer => "manufacturer",
            FactCategory::Warning => "warning",
            FactCategory::Description => "description",
        }
    }

    /// Localized label used with the external model and in rendered
    /// documents.
    pub fn label(self) -> &'static str {
        match self {
            FactCategory::Name => "Drug Name",
            FactCategory::Instructions => "Instructions",
            FactCategory::Dosage => "Dosage",
            FactCategory::SideEffects => "Side Effects",
            FactCategory::Category => "Category",
            FactCategory::Indications => "General Indications",
            FactCategory::Packaging => "Shape and size",
            FactCategory::Composition => "Composition",
            FactCategory::Contraindications => "Contraindications",
            FactCategory::Manufacturer => "Manufacturer",
            FactCategory::Warning => "Warning",
            FactCategory::Description => "Description",
        }
    }

    /// Inverse of [`FactCategory::label`]. `None` for unknown labels.
    pub fn from_label(label: &str) -> Option<FactCategory> {
        FactCategory::ALL.iter().copied().find(|c| c.label() == label)
    }

    /// Inverse of [`FactCategory::as_str`].
    pub fn from_canonical(name: &str) -> Option<FactCategory> {
        FactCategory::ALL.iter().copied().find(|c| c.as_str() == name)
    }
}

impl fmt::Display for FactCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Re-label provided facts for the external model.
pub fn localize_facts(facts: &ProvidedFacts) -> BTreeMap<&'static str, String> {
    facts
        .iter()
        .map(|(category, value)| (category.label(), value.clone()))
        .collect()
}
