//! Catalog records: one immutable row per drug/product.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::vocab::FactCategory;

/// Row key within the catalog.
pub type CandidateId = i64;

/// One catalog row. Attribute columns are keyed by fact category; the
/// bookkeeping fields (links, validity flag) live outside the attribute
/// map so they never leak into rendered documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub id: CandidateId,
    pub attributes: BTreeMap<FactCategory, String>,
    pub product_link: Option<String>,
    pub image_link: Option<String>,
    pub checked: bool,
}

impl CandidateRecord {
    pub fn new(id: CandidateId) -> Self {
        Self {
            id,
            attributes: BTreeMap::new(),
            product_link: None,
            image_link: None,
            checked: false,
        }
    }

    /// Builder-style attribute setter, mostly for tests and ingest glue.
    pub fn with(mut self, category: FactCategory, value: impl Into<String>) -> Self {
        self.attributes.insert(category, value.into());
        self
    }

    /// Attribute text for a category, if the row has that column.
    pub fn attribute(&self, category: FactCategory) -> Option<&str> {
        self.attributes.get(&category).map(String::as_str)
    }
}

/// Read-only, in-memory view of the catalog. Loaded once at engine
/// construction and shared by unlimited concurrent readers.
#[derive(Debug, Default)]
pub struct CatalogStore {
    records: Vec<CandidateRecord>,
}

impl CatalogStore {
    pub fn from_records(mut records: Vec<CandidateRecord>) -> Self {
        records.sort_by_key(|r| r.id);
        Self { records }
    }

    pub fn records(&self) -> &[CandidateRecord] {
        &self.records
    }

    pub fn get(&self, id: CandidateId) -> Option<&CandidateRecord> {
        self.records
            .binary_search_by_key(&id, |r| r.id)
            .ok()
            .map(|index| &self.records[index])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_lookup() {
        let record = CandidateRecord::new(1)
            .with(FactCategory::Name, "Panadol 500 mg")
            .with(FactCategory::SideEffects, "Mual");

        assert_eq!(record.attribute(FactCategory::Name), Some("Panadol 500 mg"));
        assert_eq!(record.attribute(FactCategory::Dosage), None);
    }

    #[test]
    fn store_sorts_and_finds_by_id() {
        let store = CatalogStore::from_records(vec![
            CandidateRecord::new(3),
            CandidateRecord::new(1),
            CandidateRecord::new(2),
        ]);

        assert_eq!(store.len(), 3);
        assert_eq!(store.get(2).map(|r| r.id), Some(2));
        assert_eq!(store.get(9), None);
        assert_eq!(store.records()[0].id, 1);
    }
}
