//! Identifier renames valid at a date

use super::ReferenceIndex;
use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{error, info};

/// Source of identifier renames
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RenameLookup: Send + Sync {
    /// Current identifier, at `date`, of each of `identifiers` that was renamed
    async fn current_identifiers(
        &self,
        identifiers: &[String],
        date: NaiveDate,
    ) -> Result<HashMap<String, String>>;
}

/// Lookup for which no identifier was ever renamed
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRenames;

#[async_trait]
impl RenameLookup for NoRenames {
    async fn current_identifiers(
        &self,
        _identifiers: &[String],
        _date: NaiveDate,
    ) -> Result<HashMap<String, String>> {
        Ok(HashMap::new())
    }
}

/// A version link: `legi_id` is known as `legi_id_lien` from `debut` to `fin`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VersionRow {
    pub legi_id: String,
    pub legi_id_lien: String,
    pub debut: NaiveDate,
    pub fin: NaiveDate,
}

/// Rename lookup over an exported versions table
#[derive(Debug, Clone, Default)]
pub struct VersionTable {
    rows: Vec<VersionRow>,
}

impl VersionTable {
    pub fn new(rows: Vec<VersionRow>) -> Self {
        Self { rows }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let table = Self::from_json(&json)?;
        info!("Loaded {} version rows from {}", table.rows.len(), path.display());
        Ok(table)
    }

    /// Renames in force at `date`; when several rows match, the last one wins
    pub fn renames_at(&self, identifiers: &[String], date: NaiveDate) -> HashMap<String, String> {
        self.rows
            .iter()
            .filter(|row| row.debut <= date && date <= row.fin)
            .filter(|row| identifiers.contains(&row.legi_id))
            .map(|row| (row.legi_id.clone(), row.legi_id_lien.clone()))
            .collect()
    }
}

#[async_trait]
impl RenameLookup for VersionTable {
    async fn current_identifiers(
        &self,
        identifiers: &[String],
        date: NaiveDate,
    ) -> Result<HashMap<String, String>> {
        Ok(self.renames_at(identifiers, date))
    }
}

/// Re-key `index` with the identifiers current at `date`.
///
/// A failing lookup is logged and yields an empty index.
pub async fn resolve_current_identifiers(
    index: &ReferenceIndex,
    lookup: &dyn RenameLookup,
    date: NaiveDate,
) -> ReferenceIndex {
    if index.is_empty() {
        return ReferenceIndex::new();
    }

    let identifiers: Vec<String> = index.identifiers().cloned().collect();
    match lookup.current_identifiers(&identifiers, date).await {
        Ok(renames) => {
            info!("Resolved {} renamed identifiers at {}", renames.len(), date);
            index.rekeyed(&renames)
        }
        Err(e) => {
            error!("Failed to resolve current identifiers: {}", e);
            ReferenceIndex::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BillmarkError;
    use crate::parameters::ParameterTree;

    fn index() -> ReferenceIndex {
        let tree = ParameterTree::from_json(
            r#"{"class": "Node", "children": {"p": {"class": "Value",
                "reference": {"2020-01-01": [{"href": "LEGIARTI000000000001"}]}, "values": {}}}}"#,
        )
        .unwrap();
        ReferenceIndex::build(tree.root())
    }

    fn date(value: &str) -> NaiveDate {
        crate::dates::parse_iso_date(value).unwrap()
    }

    const VERSIONS: &str = r#"[
        {"legi_id": "LEGIARTI000000000001", "legi_id_lien": "LEGIARTI000000000009",
         "debut": "2024-01-01", "fin": "2999-01-01"}
    ]"#;

    #[tokio::test]
    async fn test_version_table_renames_in_range() {
        let table = VersionTable::from_json(VERSIONS).unwrap();

        let resolved = resolve_current_identifiers(&index(), &table, date("2025-01-01")).await;
        assert_eq!(resolved.parameters_for("LEGIARTI000000000009").len(), 1);
        assert!(resolved.get("LEGIARTI000000000001").is_none());

        let before = resolve_current_identifiers(&index(), &table, date("2023-01-01")).await;
        assert_eq!(before.parameters_for("LEGIARTI000000000001").len(), 1);
    }

    #[tokio::test]
    async fn test_lookup_failure_gives_empty_index() {
        let mut lookup = MockRenameLookup::new();
        lookup
            .expect_current_identifiers()
            .returning(|_, _| Err(BillmarkError::RenameLookup("unreachable".to_string())));

        let resolved = resolve_current_identifiers(&index(), &lookup, date("2025-01-01")).await;
        assert!(resolved.is_empty());
    }

    #[tokio::test]
    async fn test_empty_index_skips_lookup() {
        let mut lookup = MockRenameLookup::new();
        lookup.expect_current_identifiers().never();

        let resolved =
            resolve_current_identifiers(&ReferenceIndex::new(), &lookup, date("2025-01-01")).await;
        assert!(resolved.is_empty());
    }

    #[test]
    fn test_no_renames_keeps_keys() {
        let resolved = tokio_test::block_on(resolve_current_identifiers(
            &index(),
            &NoRenames,
            date("2025-01-01"),
        ));
        assert_eq!(resolved.len(), 1);
    }
}
