//! Frozen label encoding tables
//!
//! A [`CategoryTables`] value is produced once (fitted on training data or
//! taken from the built-in placement defaults) and is read-only afterwards.

use super::record::CATEGORICAL_FIELDS;
use crate::error::{PlacementError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Label table for a single categorical field.
///
/// Labels are kept sorted; a label's code is its position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTable {
    labels: Vec<String>,
}

impl CategoryTable {
    /// Build a table from any collection of observed labels
    pub fn from_labels<I, S>(labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let unique: BTreeSet<String> = labels
            .into_iter()
            .map(|l| l.as_ref().trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();

        if unique.is_empty() {
            return Err(PlacementError::DataError(
                "category table needs at least one label".to_string(),
            ));
        }

        Ok(Self {
            labels: unique.into_iter().collect(),
        })
    }

    /// Integer code for a label, if the label was seen at fit time
    pub fn code(&self, label: &str) -> Option<usize> {
        self.labels
            .binary_search_by(|probe| probe.as_str().cmp(label.trim()))
            .ok()
    }

    /// Label for an integer code
    pub fn label(&self, code: usize) -> Option<&str> {
        self.labels.get(code).map(String::as_str)
    }

    /// Number of labels (the valid code range is `0..cardinality`)
    pub fn cardinality(&self) -> usize {
        self.labels.len()
    }

    /// Labels in code order
    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

/// Category tables for every categorical raw field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTables {
    tables: BTreeMap<String, CategoryTable>,
}

impl CategoryTables {
    /// Fit tables from the observed labels of each categorical column.
    ///
    /// Every field in [`CATEGORICAL_FIELDS`] must be present.
    pub fn fit(columns: &BTreeMap<String, Vec<String>>) -> Result<Self> {
        let mut tables = BTreeMap::new();
        for field in CATEGORICAL_FIELDS {
            let labels = columns
                .get(field)
                .ok_or_else(|| PlacementError::MissingField(field.to_string()))?;
            let table = CategoryTable::from_labels(labels).map_err(|_| {
                PlacementError::DataError(format!("column '{}' has no labels", field))
            })?;
            tables.insert(field.to_string(), table);
        }
        Ok(Self { tables })
    }

    /// Tables matching the labels of the campus placement dataset
    pub fn placement_defaults() -> Self {
        let defaults: [(&str, &[&str]); 7] = [
            ("gender", &["F", "M"]),
            ("ssc_b", &["Central", "Others"]),
            ("hsc_b", &["Central", "Others"]),
            ("hsc_s", &["Arts", "Commerce", "Science"]),
            ("degree_t", &["Comm&Mgmt", "Others", "Sci&Tech"]),
            ("workex", &["No", "Yes"]),
            ("specialisation", &["Mkt&Fin", "Mkt&HR"]),
        ];

        let tables = defaults
            .iter()
            .map(|(field, labels)| {
                let table = CategoryTable {
                    labels: labels.iter().map(|l| l.to_string()).collect(),
                };
                (field.to_string(), table)
            })
            .collect();

        Self { tables }
    }

    /// Table for a field
    pub fn table(&self, field: &str) -> Result<&CategoryTable> {
        self.tables
            .get(field)
            .ok_or_else(|| PlacementError::ConfigError(format!("no category table for '{}'", field)))
    }

    /// Encode a label of `field`, failing with `UnknownCategory` for unseen labels
    pub fn encode(&self, field: &str, label: &str) -> Result<usize> {
        let table = self.table(field)?;
        table.code(label).ok_or_else(|| PlacementError::UnknownCategory {
            field: field.to_string(),
            value: label.to_string(),
            expected: table.labels().join(", "),
        })
    }

    /// Iterate over (field, table) pairs in field-name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CategoryTable)> {
        self.tables.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl Default for CategoryTables {
    fn default() -> Self {
        Self::placement_defaults()
    }
}
