//! Explainer context shared by every explanation call

use super::aggregate::{aggregate_top_k, explainer_importance, ExplanationSummary, FeatureImportance, DEFAULT_TOP_K};
use super::linear::{Attribution, LinearExplainer, LinearModel};
use crate::error::{PlacementError, Result};
use crate::preprocessing::{FeatureEncoder, FeatureVector, StudentRecord, N_FEATURES};
use crate::synthetic::{
    BackgroundDataset, BackgroundGenerator, DEFAULT_BACKGROUND_SAMPLES, DEFAULT_BACKGROUND_SEED,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::info;

/// Which of the two models to explain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// Placement classifier (logistic link)
    Placement,
    /// Salary regressor (identity link)
    Salary,
}

impl ModelKind {
    pub const ALL: [ModelKind; 2] = [ModelKind::Placement, ModelKind::Salary];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Placement => "placement",
            ModelKind::Salary => "salary",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelKind {
    type Err = PlacementError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "placement" => Ok(ModelKind::Placement),
            "salary" => Ok(ModelKind::Salary),
            other => Err(PlacementError::InvalidInput(format!(
                "unknown model type '{}', expected 'placement' or 'salary'",
                other
            ))),
        }
    }
}

/// Explainer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplainerConfig {
    /// Number of synthetic background rows
    pub background_samples: usize,
    /// Background generator seed
    pub seed: u64,
    /// Length of the top positive / negative lists
    pub top_k: usize,
}

impl Default for ExplainerConfig {
    fn default() -> Self {
        Self {
            background_samples: DEFAULT_BACKGROUND_SAMPLES,
            seed: DEFAULT_BACKGROUND_SEED,
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl ExplainerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_background_samples(mut self, n: usize) -> Self {
        self.background_samples = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_top_k(mut self, k: usize) -> Self {
        self.top_k = k;
        self
    }
}

/// Immutable state behind every explanation: the encoder, the background
/// population and one precomputed explainer per model.
///
/// Built once and shared (typically through `Arc`); nothing mutates it after
/// construction, so concurrent calls need no locking.
#[derive(Debug, Clone)]
pub struct ExplainerContext {
    encoder: FeatureEncoder,
    background: BackgroundDataset,
    placement: LinearExplainer,
    salary: LinearExplainer,
    config: ExplainerConfig,
}

impl ExplainerContext {
    /// Generate the background from the encoder's category tables and build both explainers
    pub fn new(
        encoder: FeatureEncoder,
        placement: LinearModel,
        salary: LinearModel,
        config: ExplainerConfig,
    ) -> Result<Self> {
        let background = BackgroundGenerator::new(encoder.categories().clone())
            .generate(config.background_samples, config.seed)?;
        Self::with_background(encoder, placement, salary, background, config)
    }

    /// Build over an existing background set
    pub fn with_background(
        encoder: FeatureEncoder,
        placement: LinearModel,
        salary: LinearModel,
        background: BackgroundDataset,
        config: ExplainerConfig,
    ) -> Result<Self> {
        for (kind, model) in [(ModelKind::Placement, &placement), (ModelKind::Salary, &salary)] {
            if model.n_features() != N_FEATURES {
                return Err(PlacementError::DimensionMismatch {
                    context: format!("{} model weights", kind),
                    expected: N_FEATURES,
                    actual: model.n_features(),
                });
            }
        }

        let placement = LinearExplainer::new(placement, &background)?;
        let salary = LinearExplainer::new(salary, &background)?;

        info!(
            background_samples = background.n_samples(),
            seed = ?background.seed(),
            placement_base = placement.base_value(),
            salary_base = salary.base_value(),
            "Explainer context initialized"
        );

        Ok(Self {
            encoder,
            background,
            placement,
            salary,
            config,
        })
    }

    pub fn encoder(&self) -> &FeatureEncoder {
        &self.encoder
    }

    pub fn background(&self) -> &BackgroundDataset {
        &self.background
    }

    pub fn config(&self) -> &ExplainerConfig {
        &self.config
    }

    /// The precomputed explainer for a model
    pub fn explainer(&self, kind: ModelKind) -> &LinearExplainer {
        match kind {
            ModelKind::Placement => &self.placement,
            ModelKind::Salary => &self.salary,
        }
    }

    /// Expected margin of a model over the background
    pub fn base_value(&self, kind: ModelKind) -> f64 {
        self.explainer(kind).base_value()
    }

    /// Raw attribution of an encoded vector
    pub fn attribute(&self, kind: ModelKind, features: &FeatureVector) -> Result<Attribution> {
        self.explainer(kind).attribute(features.view())
    }

    /// Encode, attribute and rank one record
    pub fn explain_one(&self, kind: ModelKind, record: &StudentRecord) -> Result<ExplanationSummary> {
        let features = self.encoder.encode(record)?;
        self.explain_features(kind, &features)
    }

    /// Attribute and rank an already encoded vector
    pub fn explain_features(&self, kind: ModelKind, features: &FeatureVector) -> Result<ExplanationSummary> {
        let attribution = self.attribute(kind, features)?;
        aggregate_top_k(&attribution, self.explainer(kind).feature_names(), self.config.top_k)
    }

    /// Mean |contribution| per feature over the background, ranked
    pub fn global_importance(&self, kind: ModelKind) -> Result<Vec<FeatureImportance>> {
        explainer_importance(self.explainer(kind), &self.background)
    }
}
