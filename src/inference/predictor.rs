//! Prediction facade over a loaded model bundle

use super::bundle::ModelBundle;
use super::skills::{analyze_skill_gaps, SkillAnalysis};
use crate::error::{PlacementError, Result};
use crate::explainability::{
    sigmoid, ExplainerConfig, ExplainerContext, ExplanationSummary, FeatureImportance, ModelKind,
};
use crate::preprocessing::{FeatureEncoder, FeatureVector, StudentRecord};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Prediction configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictorConfig {
    /// Floor applied to every salary estimate
    pub min_salary: f64,
    /// Relative half-width of the reported salary range
    pub salary_band: f64,
    /// Salary is only estimated above this placement probability
    pub salary_probability_threshold: f64,
    /// Probability at which a student counts as placed
    pub decision_threshold: f64,
    /// Build the explainer context on load
    pub enable_explanations: bool,
    pub explainer: ExplainerConfig,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            min_salary: 200_000.0,
            salary_band: 0.10,
            salary_probability_threshold: 0.3,
            decision_threshold: 0.5,
            enable_explanations: true,
            explainer: ExplainerConfig::default(),
        }
    }
}

impl PredictorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_salary(mut self, min_salary: f64) -> Self {
        self.min_salary = min_salary;
        self
    }

    pub fn with_explanations(mut self, enabled: bool) -> Self {
        self.enable_explanations = enabled;
        self
    }

    pub fn with_explainer(mut self, explainer: ExplainerConfig) -> Self {
        self.explainer = explainer;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementResult {
    pub placed: bool,
    /// Probability of the "Placed" class
    pub probability: f64,
    /// Probability of the predicted class
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryResult {
    pub expected_salary: f64,
    pub salary_range: SalaryRange,
}

/// Explanations attached to a complete prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionExplanations {
    pub placement: ExplanationSummary,
    pub salary: Option<ExplanationSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub placement: PlacementResult,
    pub salary: Option<SalaryResult>,
    pub skill_analysis: SkillAnalysis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanations: Option<PredictionExplanations>,
}

/// Placement probability, salary estimate, skill gaps and explanations.
///
/// Explanations are optional: when the explainer context cannot be built
/// the predictor still serves predictions and explanation calls return
/// [`PlacementError::UninitializedExplainer`].
#[derive(Debug, Clone)]
pub struct PlacementPredictor {
    bundle: Arc<ModelBundle>,
    encoder: FeatureEncoder,
    explainer: Option<Arc<ExplainerContext>>,
    config: PredictorConfig,
}

impl PlacementPredictor {
    /// Wrap a bundle; explanation setup failures are logged, not returned
    pub fn from_bundle(bundle: ModelBundle, config: PredictorConfig) -> Self {
        let encoder = bundle.encoder();
        let explainer = if config.enable_explanations {
            match ExplainerContext::new(
                encoder.clone(),
                bundle.placement.clone(),
                bundle.salary.clone(),
                config.explainer.clone(),
            ) {
                Ok(ctx) => Some(Arc::new(ctx)),
                Err(e) => {
                    warn!(error = %e, "Explainer unavailable, serving predictions without explanations");
                    None
                }
            }
        } else {
            None
        };

        Self {
            bundle: Arc::new(bundle),
            encoder,
            explainer,
            config,
        }
    }

    /// Load a bundle from disk
    pub fn load<P: AsRef<Path>>(path: P, config: PredictorConfig) -> Result<Self> {
        let bundle = ModelBundle::load(path)?;
        let predictor = Self::from_bundle(bundle, config);
        info!(
            explanations = predictor.explanations_enabled(),
            "Predictor ready"
        );
        Ok(predictor)
    }

    pub fn bundle(&self) -> &ModelBundle {
        &self.bundle
    }

    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }

    pub fn explanations_enabled(&self) -> bool {
        self.explainer.is_some()
    }

    /// The explainer context, if it was built
    pub fn explainer(&self) -> Result<&ExplainerContext> {
        self.explainer
            .as_deref()
            .ok_or(PlacementError::UninitializedExplainer)
    }

    pub fn encode(&self, record: &StudentRecord) -> Result<FeatureVector> {
        self.encoder.encode(record)
    }

    fn placement_from_features(&self, features: &FeatureVector) -> Result<PlacementResult> {
        let probability = sigmoid(self.bundle.placement.margin(features.view())?);
        Ok(PlacementResult {
            placed: probability >= self.config.decision_threshold,
            probability,
            confidence: probability.max(1.0 - probability),
        })
    }

    fn salary_from_features(&self, features: &FeatureVector) -> Result<SalaryResult> {
        let raw = self.bundle.salary.margin(features.view())?;
        let expected_salary = raw.max(self.config.min_salary);
        Ok(SalaryResult {
            expected_salary,
            salary_range: SalaryRange {
                min: expected_salary * (1.0 - self.config.salary_band),
                max: expected_salary * (1.0 + self.config.salary_band),
            },
        })
    }

    pub fn predict_placement(&self, record: &StudentRecord) -> Result<PlacementResult> {
        self.placement_from_features(&self.encode(record)?)
    }

    /// Salary estimate, floored at `min_salary`
    pub fn predict_salary(&self, record: &StudentRecord) -> Result<SalaryResult> {
        self.salary_from_features(&self.encode(record)?)
    }

    /// Placement, conditional salary, skill gaps and (when available) explanations
    pub fn predict_complete(&self, record: &StudentRecord) -> Result<PredictionResponse> {
        let features = self.encode(record)?;
        let placement = self.placement_from_features(&features)?;

        let salary = if placement.probability > self.config.salary_probability_threshold {
            Some(self.salary_from_features(&features)?)
        } else {
            None
        };

        let skill_analysis = analyze_skill_gaps(record, placement.probability);
        let explanations = self.explain_prediction(&features, salary.is_some());

        Ok(PredictionResponse {
            placement,
            salary,
            skill_analysis,
            explanations,
        })
    }

    /// Validate an untyped JSON object and run the complete prediction
    pub fn predict_json(&self, value: &serde_json::Value) -> Result<PredictionResponse> {
        let record = StudentRecord::from_json(value)?;
        self.predict_complete(&record)
    }

    fn explain_prediction(&self, features: &FeatureVector, with_salary: bool) -> Option<PredictionExplanations> {
        let ctx = self.explainer.as_ref()?;
        let explained = ctx.explain_features(ModelKind::Placement, features).and_then(|placement| {
            let salary = if with_salary {
                Some(ctx.explain_features(ModelKind::Salary, features)?)
            } else {
                None
            };
            Ok(PredictionExplanations { placement, salary })
        });

        match explained {
            Ok(explanations) => Some(explanations),
            Err(e) => {
                warn!(error = %e, "Explanation failed, returning prediction without it");
                None
            }
        }
    }

    /// Ranked explanation of one model's output for a record
    pub fn explain(&self, kind: ModelKind, record: &StudentRecord) -> Result<ExplanationSummary> {
        self.explainer()?.explain_one(kind, record)
    }

    /// Global importance ranking for one model
    pub fn global_importance(&self, kind: ModelKind) -> Result<Vec<FeatureImportance>> {
        self.explainer()?.global_importance(kind)
    }
}
