//! Data preprocessing module
//!
//! Turns raw student data into the fixed 15-feature layout the models use:
//! - Boundary validation of untyped records ([`StudentRecord`])
//! - Frozen label encoding tables ([`CategoryTables`])
//! - Feature encoding with the three engineered features ([`FeatureEncoder`])
//! - CSV loading and cleaning of the placement dataset ([`PlacementDataset`])

mod dataset;
mod encoder;
mod features;
mod record;

pub use dataset::PlacementDataset;
pub use encoder::{CategoryTable, CategoryTables};
pub use features::{
    derived_features, display_name, feature_names, FeatureEncoder, FeatureVector, DISPLAY_NAMES,
    FEATURE_NAMES, N_FEATURES,
};
pub use record::{FieldKind, StudentRecord, CATEGORICAL_FIELDS, PERCENTAGE_FIELDS, RAW_FIELDS};

use crate::error::Result;
use ndarray::Array2;

/// Stack encoded feature vectors into a matrix, one row per vector
pub fn stack_features(vectors: &[FeatureVector]) -> Result<Array2<f64>> {
    let flat: Vec<f64> = vectors.iter().flat_map(|v| v.values().iter().copied()).collect();
    Ok(Array2::from_shape_vec((vectors.len(), N_FEATURES), flat)?)
}
