//! Fixed-order feature vectors and the record encoder

use super::encoder::CategoryTables;
use super::record::StudentRecord;
use crate::error::{PlacementError, Result};
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

/// Number of features seen by the models (12 raw + 3 derived)
pub const N_FEATURES: usize = 15;

/// Feature names in model order
pub const FEATURE_NAMES: [&str; N_FEATURES] = [
    "gender",
    "ssc_p",
    "ssc_b",
    "hsc_p",
    "hsc_b",
    "hsc_s",
    "degree_p",
    "degree_t",
    "workex",
    "etest_p",
    "specialisation",
    "mba_p",
    "avg_academic_score",
    "academic_consistency",
    "mba_performance",
];

/// Human-readable feature labels, aligned with [`FEATURE_NAMES`]
pub const DISPLAY_NAMES: [&str; N_FEATURES] = [
    "Gender",
    "SSC Percentage",
    "SSC Board",
    "HSC Percentage",
    "HSC Board",
    "HSC Stream",
    "Degree Percentage",
    "Degree Type",
    "Work Experience",
    "Employability Test",
    "MBA Specialization",
    "MBA Percentage",
    "Average Academic Score",
    "Academic Consistency",
    "MBA Performance",
];

/// Readable label for a feature key; unknown keys are returned unchanged
pub fn display_name(feature: &str) -> &str {
    FEATURE_NAMES
        .iter()
        .position(|&name| name == feature)
        .map(|idx| DISPLAY_NAMES[idx])
        .unwrap_or(feature)
}

/// Owned feature names, for APIs that take `&[String]`
pub fn feature_names() -> Vec<String> {
    FEATURE_NAMES.iter().map(|s| s.to_string()).collect()
}

/// The three engineered features, computed from the academic percentages.
///
/// Returns `(avg_academic_score, academic_consistency, mba_performance)`.
/// Consistency is the sample standard deviation (n - 1 denominator).
pub fn derived_features(ssc_p: f64, hsc_p: f64, degree_p: f64, mba_p: f64) -> (f64, f64, f64) {
    let avg = (ssc_p + hsc_p + degree_p) / 3.0;
    let sum_sq = (ssc_p - avg).powi(2) + (hsc_p - avg).powi(2) + (degree_p - avg).powi(2);
    let consistency = (sum_sq / 2.0).sqrt();
    (avg, consistency, mba_p)
}

/// A 15-element feature vector in model order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    values: [f64; N_FEATURES],
}

impl FeatureVector {
    /// Build from the 12 raw values in declared order; derived features are appended
    pub fn from_raw(raw: [f64; 12]) -> Self {
        let (avg, consistency, echo) = derived_features(raw[1], raw[3], raw[6], raw[11]);
        let mut values = [0.0; N_FEATURES];
        values[..12].copy_from_slice(&raw);
        values[12] = avg;
        values[13] = consistency;
        values[14] = echo;
        Self { values }
    }

    /// Build from a full slice, checking the length
    pub fn from_slice(values: &[f64]) -> Result<Self> {
        let values: [f64; N_FEATURES] =
            values
                .try_into()
                .map_err(|_| PlacementError::DimensionMismatch {
                    context: "feature vector".to_string(),
                    expected: N_FEATURES,
                    actual: values.len(),
                })?;
        Ok(Self { values })
    }

    /// Values in model order
    pub fn values(&self) -> &[f64; N_FEATURES] {
        &self.values
    }

    /// Value of a named feature
    pub fn get(&self, feature: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|&name| name == feature)
            .map(|idx| self.values[idx])
    }

    /// Borrow as an ndarray view
    pub fn view(&self) -> ArrayView1<'_, f64> {
        ArrayView1::from(&self.values[..])
    }

    /// Copy into an ndarray vector
    pub fn to_array(&self) -> Array1<f64> {
        Array1::from_vec(self.values.to_vec())
    }

    /// Length, always [`N_FEATURES`]
    pub fn len(&self) -> usize {
        N_FEATURES
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Maps validated records to feature vectors through frozen category tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureEncoder {
    categories: CategoryTables,
}

impl FeatureEncoder {
    /// Create an encoder over fitted category tables
    pub fn new(categories: CategoryTables) -> Self {
        Self { categories }
    }

    /// The category tables this encoder uses
    pub fn categories(&self) -> &CategoryTables {
        &self.categories
    }

    /// Encode a record into model order
    pub fn encode(&self, record: &StudentRecord) -> Result<FeatureVector> {
        let c = &self.categories;
        let raw = [
            c.encode("gender", &record.gender)? as f64,
            record.ssc_p,
            c.encode("ssc_b", &record.ssc_b)? as f64,
            record.hsc_p,
            c.encode("hsc_b", &record.hsc_b)? as f64,
            c.encode("hsc_s", &record.hsc_s)? as f64,
            record.degree_p,
            c.encode("degree_t", &record.degree_t)? as f64,
            c.encode("workex", &record.workex)? as f64,
            record.etest_p,
            c.encode("specialisation", &record.specialisation)? as f64,
            record.mba_p,
        ];
        Ok(FeatureVector::from_raw(raw))
    }

    /// Validate an untyped JSON object and encode it
    pub fn encode_json(&self, value: &serde_json::Value) -> Result<FeatureVector> {
        let record = StudentRecord::from_json(value)?;
        self.encode(&record)
    }
}

impl Default for FeatureEncoder {
    fn default() -> Self {
        Self::new(CategoryTables::placement_defaults())
    }
}
