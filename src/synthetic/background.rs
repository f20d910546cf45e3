//! Synthetic background population for attribution baselines

use crate::error::{PlacementError, Result};
use crate::preprocessing::{
    derived_features, feature_names, CategoryTables, FieldKind, N_FEATURES, RAW_FIELDS,
};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

/// Default number of background rows
pub const DEFAULT_BACKGROUND_SAMPLES: usize = 100;
/// Default generator seed
pub const DEFAULT_BACKGROUND_SEED: u64 = 42;

/// Half-open sampling interval `[low, high)` for a percentage field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    pub field: String,
    pub low: f64,
    pub high: f64,
}

impl NumericRange {
    pub fn new(field: &str, low: f64, high: f64) -> Self {
        Self {
            field: field.to_string(),
            low,
            high,
        }
    }
}

/// Fixed sampling intervals for the percentage fields
pub fn default_ranges() -> Vec<NumericRange> {
    vec![
        NumericRange::new("ssc_p", 40.0, 95.0),
        NumericRange::new("hsc_p", 40.0, 95.0),
        NumericRange::new("degree_p", 45.0, 90.0),
        NumericRange::new("etest_p", 50.0, 95.0),
        NumericRange::new("mba_p", 50.0, 90.0),
    ]
}

/// Reference population used as the attribution baseline.
///
/// Owns its rows; read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundDataset {
    data: Array2<f64>,
    feature_names: Vec<String>,
    seed: Option<u64>,
}

impl BackgroundDataset {
    /// Wrap an existing matrix (rows are samples)
    pub fn from_array(data: Array2<f64>, feature_names: Vec<String>) -> Result<Self> {
        if data.nrows() == 0 {
            return Err(PlacementError::InvalidInput(
                "background dataset must have at least one row".to_string(),
            ));
        }
        if data.ncols() != feature_names.len() {
            return Err(PlacementError::DimensionMismatch {
                context: "background feature names".to_string(),
                expected: data.ncols(),
                actual: feature_names.len(),
            });
        }
        Ok(Self {
            data,
            feature_names,
            seed: None,
        })
    }

    /// Rows as a matrix
    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    /// A single row
    pub fn row(&self, idx: usize) -> ArrayView1<'_, f64> {
        self.data.row(idx)
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Seed the rows were generated from, if synthetic
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn n_samples(&self) -> usize {
        self.data.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.data.ncols()
    }

    /// Column means
    pub fn means(&self) -> Array1<f64> {
        self.data
            .mean_axis(Axis(0))
            .unwrap_or_else(|| Array1::zeros(self.n_features()))
    }
}

/// Draws synthetic student profiles from fixed per-field distributions
#[derive(Debug, Clone)]
pub struct BackgroundGenerator {
    categories: CategoryTables,
    ranges: Vec<NumericRange>,
}

impl Default for BackgroundGenerator {
    fn default() -> Self {
        Self::new(CategoryTables::placement_defaults())
    }
}

impl BackgroundGenerator {
    /// Create a generator; categorical fields are drawn over the table cardinalities
    pub fn new(categories: CategoryTables) -> Self {
        Self {
            categories,
            ranges: default_ranges(),
        }
    }

    /// Override the percentage intervals
    pub fn with_ranges(mut self, ranges: Vec<NumericRange>) -> Self {
        self.ranges = ranges;
        self
    }

    /// Generate `n` rows from `seed`.
    ///
    /// Raw fields are filled column by column in declared order, then the
    /// derived features are computed per row. The same `(n, seed)` always
    /// yields bit-identical rows.
    pub fn generate(&self, n: usize, seed: u64) -> Result<BackgroundDataset> {
        if n == 0 {
            return Err(PlacementError::InvalidInput(
                "background size must be positive".to_string(),
            ));
        }

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let mut data = Array2::<f64>::zeros((n, N_FEATURES));

        for (col, (field, kind)) in RAW_FIELDS.iter().enumerate() {
            match kind {
                FieldKind::Categorical => {
                    let cardinality = self.categories.table(field)?.cardinality();
                    for row in 0..n {
                        data[[row, col]] = rng.gen_range(0..cardinality) as f64;
                    }
                }
                FieldKind::Percentage => {
                    let range = self.range(field)?;
                    for row in 0..n {
                        data[[row, col]] = rng.gen_range(range.low..range.high);
                    }
                }
            }
        }

        for mut row in data.rows_mut() {
            let (avg, consistency, echo) = derived_features(row[1], row[3], row[6], row[11]);
            row[12] = avg;
            row[13] = consistency;
            row[14] = echo;
        }

        Ok(BackgroundDataset {
            data,
            feature_names: feature_names(),
            seed: Some(seed),
        })
    }

    fn range(&self, field: &str) -> Result<&NumericRange> {
        let range = self
            .ranges
            .iter()
            .find(|r| r.field == field)
            .ok_or_else(|| PlacementError::ConfigError(format!("no sampling range for '{}'", field)))?;
        if !(range.low < range.high) {
            return Err(PlacementError::ConfigError(format!(
                "empty sampling range for '{}': [{}, {})",
                field, range.low, range.high
            )));
        }
        Ok(range)
    }
}

/// Generate a background with the default tables and intervals
pub fn generate_background(n: usize, seed: u64) -> Result<BackgroundDataset> {
    BackgroundGenerator::default().generate(n, seed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_and_names() {
        let bg = generate_background(DEFAULT_BACKGROUND_SAMPLES, DEFAULT_BACKGROUND_SEED).unwrap();
        assert_eq!(bg.n_samples(), 100);
        assert_eq!(bg.n_features(), N_FEATURES);
        assert_eq!(bg.feature_names()[14], "mba_performance");
        assert_eq!(bg.seed(), Some(42));
    }

    #[test]
    fn test_deterministic_for_seed() {
        let a = generate_background(50, 7).unwrap();
        let b = generate_background(50, 7).unwrap();
        let c = generate_background(50, 8).unwrap();
        assert_eq!(a, b);
        assert_ne!(a.data(), c.data());
    }

    #[test]
    fn test_values_within_ranges() {
        let bg = generate_background(200, 1).unwrap();
        for row in bg.data().rows() {
            assert!(row[0] == 0.0 || row[0] == 1.0);
            assert!((0.0..3.0).contains(&row[5]));
            assert!((40.0..95.0).contains(&row[1]));
            assert!((45.0..90.0).contains(&row[6]));
            assert!((50.0..95.0).contains(&row[9]));
            assert_eq!(row[11], row[14]);
            let expected_avg = (row[1] + row[3] + row[6]) / 3.0;
            assert!((row[12] - expected_avg).abs() < 1e-12);
        }
    }

    #[test]
    fn test_zero_rows_rejected() {
        assert!(generate_background(0, 42).is_err());
    }

    #[test]
    fn test_missing_range_is_config_error() {
        let generator = BackgroundGenerator::default()
            .with_ranges(vec![NumericRange::new("ssc_p", 40.0, 95.0)]);
        assert!(matches!(
            generator.generate(10, 42),
            Err(PlacementError::ConfigError(_))
        ));
    }

    #[test]
    fn test_from_array_checks_names() {
        let data = Array2::zeros((3, 2));
        assert!(BackgroundDataset::from_array(data.clone(), vec!["a".into()]).is_err());
        let bg = BackgroundDataset::from_array(data, vec!["a".into(), "b".into()]).unwrap();
        assert_eq!(bg.means().len(), 2);
    }
}
