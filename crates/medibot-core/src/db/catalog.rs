//! Catalog table operations.

use rusqlite::params;

use super::{Database, DbResult};
use crate::models::{CandidateRecord, CatalogStore};
use crate::vocab::FactCategory;

impl Database {
    /// Insert or update one catalog row.
    pub fn upsert_catalog_product(&self, record: &CandidateRecord) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO catalog (
                id, drug_name, instructions, dosage, side_effects, category,
                indications, packaging, composition, contraindications,
                manufacturer, warning, description,
                product_link, image_link, checked, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, datetime('now'))
            ON CONFLICT(id) DO UPDATE SET
                drug_name = excluded.drug_name,
                instructions = excluded.instructions,
                dosage = excluded.dosage,
                side_effects = excluded.side_effects,
                category = excluded.category,
                indications = excluded.indications,
                packaging = excluded.packaging,
                composition = excluded.composition,
                contraindications = excluded.contraindications,
                manufacturer = excluded.manufacturer,
                warning = excluded.warning,
                description = excluded.description,
                product_link = excluded.product_link,
                image_link = excluded.image_link,
                checked = excluded.checked,
                updated_at = datetime('now')
            "#,
            params![
                record.id,
                record.attribute(FactCategory::Name),
                record.attribute(FactCategory::Instructions),
                record.attribute(FactCategory::Dosage),
                record.attribute(FactCategory::SideEffects),
                record.attribute(FactCategory::Category),
                record.attribute(FactCategory::Indications),
                record.attribute(FactCategory::Packaging),
                record.attribute(FactCategory::Composition),
                record.attribute(FactCategory::Contraindications),
                record.attribute(FactCategory::Manufacturer),
                record.attribute(FactCategory::Warning),
                record.attribute(FactCategory::Description),
                record.product_link,
                record.image_link,
                record.checked,
            ],
        )?;
        Ok(())
    }

    /// Load the whole catalog into memory, ordered by id.
    pub fn load_catalog(&self) -> DbResult<CatalogStore> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, drug_name, instructions, dosage, side_effects, category,
                   indications, packaging, composition, contraindications,
                   manufacturer, warning, description,
                   product_link, image_link, checked
            FROM catalog
            ORDER BY id
            "#,
        )?;

        let records = stmt
            .query_map([], |row| {
                let mut record = CandidateRecord::new(row.get(0)?);
                for (offset, category) in FactCategory::ALL.into_iter().enumerate() {
                    let value: Option<String> = row.get(1 + offset)?;
                    match value {
                        Some(text) if !text.trim().is_empty() => {
                            record.attributes.insert(category, text);
                        }
                        _ => {}
                    }
                }
                record.product_link = row.get(13)?;
                record.image_link = row.get(14)?;
                record.checked = row.get(15)?;
                Ok(record)
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CatalogStore::from_records(records))
    }

    /// Number of catalog rows.
    pub fn catalog_len(&self) -> DbResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM catalog", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
