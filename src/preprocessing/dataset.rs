//! Placement dataset loading and cleaning

use super::record::{StudentRecord, CATEGORICAL_FIELDS};
use crate::error::{PlacementError, Result};
use polars::prelude::*;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// Column holding the placement outcome ("Placed" / "Not Placed")
pub const STATUS_COLUMN: &str = "status";
/// Column holding the offered salary (null for students who were not placed)
pub const SALARY_COLUMN: &str = "salary";
/// Status label counted as a positive outcome
pub const PLACED_LABEL: &str = "Placed";

/// Cleaned placement dataset: one validated record per row plus its targets
#[derive(Debug, Clone, Default)]
pub struct PlacementDataset {
    records: Vec<StudentRecord>,
    placed: Vec<bool>,
    salaries: Vec<f64>,
}

impl PlacementDataset {
    /// Build a dataset from already validated rows
    pub fn from_rows(records: Vec<StudentRecord>, placed: Vec<bool>, salaries: Vec<f64>) -> Result<Self> {
        if records.len() != placed.len() || records.len() != salaries.len() {
            return Err(PlacementError::DimensionMismatch {
                context: "dataset targets".to_string(),
                expected: records.len(),
                actual: placed.len().min(salaries.len()),
            });
        }
        Ok(Self {
            records,
            placed,
            salaries,
        })
    }

    /// Load and clean a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(1000))
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()?;

        info!(
            path = %path.display(),
            rows = df.height(),
            columns = df.width(),
            "Dataset loaded"
        );

        Self::from_dataframe(&df)
    }

    /// Clean a dataframe: missing salaries become 0, rows missing anything
    /// else are dropped.
    pub fn from_dataframe(df: &DataFrame) -> Result<Self> {
        let mut labels: BTreeMap<&str, Vec<Option<String>>> = BTreeMap::new();
        for field in CATEGORICAL_FIELDS {
            labels.insert(field, string_column(df, field)?);
        }

        let ssc_p = float_column(df, "ssc_p")?;
        let hsc_p = float_column(df, "hsc_p")?;
        let degree_p = float_column(df, "degree_p")?;
        let etest_p = float_column(df, "etest_p")?;
        let mba_p = float_column(df, "mba_p")?;
        let status = string_column(df, STATUS_COLUMN)?;
        let salary = match df.column(SALARY_COLUMN) {
            Ok(_) => float_column(df, SALARY_COLUMN)?,
            Err(_) => vec![None; df.height()],
        };

        let mut dataset = Self::default();
        let mut dropped = 0usize;

        for row in 0..df.height() {
            let label = |field: &str| labels.get(field).and_then(|col| col[row].clone());

            let parts = (
                label("gender"),
                ssc_p[row],
                label("ssc_b"),
                hsc_p[row],
                label("hsc_b"),
                label("hsc_s"),
                degree_p[row],
                label("degree_t"),
                label("workex"),
                etest_p[row],
                label("specialisation"),
                mba_p[row],
            );

            let record = match parts {
                (
                    Some(gender),
                    Some(ssc_p),
                    Some(ssc_b),
                    Some(hsc_p),
                    Some(hsc_b),
                    Some(hsc_s),
                    Some(degree_p),
                    Some(degree_t),
                    Some(workex),
                    Some(etest_p),
                    Some(specialisation),
                    Some(mba_p),
                ) => StudentRecord {
                    gender,
                    ssc_p,
                    ssc_b,
                    hsc_p,
                    hsc_b,
                    hsc_s,
                    degree_p,
                    degree_t,
                    workex,
                    etest_p,
                    specialisation,
                    mba_p,
                },
                _ => {
                    dropped += 1;
                    continue;
                }
            };

            let Some(outcome) = status[row].as_deref() else {
                dropped += 1;
                continue;
            };

            record.validate().map_err(|e| {
                PlacementError::DataError(format!("row {}: {}", row, e))
            })?;

            dataset.records.push(record);
            dataset.placed.push(outcome == PLACED_LABEL);
            dataset.salaries.push(salary[row].unwrap_or(0.0));
        }

        debug!(kept = dataset.len(), dropped, "Dataset cleaned");

        if dataset.is_empty() {
            return Err(PlacementError::DataError(
                "no complete rows left after cleaning".to_string(),
            ));
        }

        Ok(dataset)
    }

    /// Validated records
    pub fn records(&self) -> &[StudentRecord] {
        &self.records
    }

    /// Placement outcome per row
    pub fn placed(&self) -> &[bool] {
        &self.placed
    }

    /// Salary per row (0 for students who were not placed)
    pub fn salaries(&self) -> &[f64] {
        &self.salaries
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of placed students
    pub fn placed_count(&self) -> usize {
        self.placed.iter().filter(|&&p| p).count()
    }

    /// Subset containing only placed students
    pub fn placed_only(&self) -> Self {
        let mut subset = Self::default();
        for i in 0..self.len() {
            if self.placed[i] {
                subset.records.push(self.records[i].clone());
                subset.placed.push(true);
                subset.salaries.push(self.salaries[i]);
            }
        }
        subset
    }

    /// Observed labels per categorical field, used to fit category tables
    pub fn category_columns(&self) -> BTreeMap<String, Vec<String>> {
        let mut columns: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for record in &self.records {
            for (field, label) in record.categoricals() {
                columns.entry(field.to_string()).or_default().push(label.to_string());
            }
        }
        columns
    }
}

fn float_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = df
        .column(name)
        .map_err(|_| PlacementError::MissingField(name.to_string()))?;
    let series = column.as_materialized_series().cast(&DataType::Float64)?;
    Ok(series.f64()?.into_iter().collect())
}

fn string_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = df
        .column(name)
        .map_err(|_| PlacementError::MissingField(name.to_string()))?;
    let series = column.as_materialized_series().cast(&DataType::String)?;
    Ok(series
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_df() -> DataFrame {
        df!(
            "sl_no" => &[1i64, 2, 3, 4],
            "gender" => &["M", "F", "M", "F"],
            "ssc_p" => &[67.0, 79.33, 65.0, 56.0],
            "ssc_b" => &["Others", "Central", "Central", "Central"],
            "hsc_p" => &[91.0, 78.33, 68.0, 52.0],
            "hsc_b" => &["Others", "Others", "Central", "Central"],
            "hsc_s" => &["Commerce", "Science", "Arts", "Science"],
            "degree_p" => &[58.0, 77.48, 64.0, 52.0],
            "degree_t" => &["Sci&Tech", "Sci&Tech", "Comm&Mgmt", "Sci&Tech"],
            "workex" => &["No", "Yes", "No", "No"],
            "etest_p" => &[55.0, 86.5, 75.0, 66.0],
            "specialisation" => &["Mkt&HR", "Mkt&Fin", "Mkt&Fin", "Mkt&HR"],
            "mba_p" => &[Some(58.8), Some(66.28), Some(57.8), None],
            "status" => &["Placed", "Placed", "Not Placed", "Not Placed"],
            "salary" => &[Some(270000.0), Some(200000.0), None, None]
        )
        .unwrap()
    }

    #[test]
    fn test_cleaning() {
        let dataset = PlacementDataset::from_dataframe(&sample_df()).unwrap();
        // last row has a missing mba_p and is dropped
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.placed(), &[true, true, false]);
        assert_eq!(dataset.salaries(), &[270000.0, 200000.0, 0.0]);
        assert_eq!(dataset.placed_count(), 2);
    }

    #[test]
    fn test_placed_only() {
        let dataset = PlacementDataset::from_dataframe(&sample_df()).unwrap();
        let placed = dataset.placed_only();
        assert_eq!(placed.len(), 2);
        assert!(placed.placed().iter().all(|&p| p));
    }

    #[test]
    fn test_missing_column() {
        let df = df!("gender" => &["M"]).unwrap();
        assert!(matches!(
            PlacementDataset::from_dataframe(&df),
            Err(PlacementError::MissingField(_))
        ));
    }

    #[test]
    fn test_category_columns() {
        let dataset = PlacementDataset::from_dataframe(&sample_df()).unwrap();
        let columns = dataset.category_columns();
        assert_eq!(columns["hsc_s"], vec!["Commerce", "Science", "Arts"]);
    }
}
