//! Ranked per-prediction explanations and global importance

use super::linear::{Attribution, LinearExplainer, LinearModel};
use crate::error::{PlacementError, Result};
use crate::preprocessing::display_name;
use crate::synthetic::BackgroundDataset;
use serde::{Deserialize, Serialize};

/// Number of features kept in the top positive / negative lists
pub const DEFAULT_TOP_K: usize = 5;

/// Direction of a feature's contribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Positive,
    Negative,
    /// Exactly zero; listed in neither top list
    Neutral,
}

impl Impact {
    pub fn of(contribution: f64) -> Self {
        if contribution > 0.0 {
            Impact::Positive
        } else if contribution < 0.0 {
            Impact::Negative
        } else {
            Impact::Neutral
        }
    }
}

/// One feature's share of a prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImpact {
    /// Readable feature label
    pub feature: String,
    /// Feature key in model order
    pub feature_key: String,
    /// Encoded value of the feature for this prediction
    pub value: f64,
    /// Signed contribution (SHAP value)
    pub shap_value: f64,
    pub impact: Impact,
    pub abs_impact: f64,
}

/// Ranked explanation of a single prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplanationSummary {
    pub base_value: f64,
    pub prediction_value: f64,
    /// All features, sorted by descending |contribution|
    pub feature_impacts: Vec<FeatureImpact>,
    pub top_positive_features: Vec<FeatureImpact>,
    pub top_negative_features: Vec<FeatureImpact>,
}

/// Rank an attribution with the default top-k of 5
pub fn aggregate(attribution: &Attribution, feature_names: &[String]) -> Result<ExplanationSummary> {
    aggregate_top_k(attribution, feature_names, DEFAULT_TOP_K)
}

/// Rank an attribution.
///
/// Impacts are sorted by descending |contribution| with a stable sort, so
/// ties keep feature declaration order. The top lists filter that sorted
/// list by sign and take the first `top_k` entries.
pub fn aggregate_top_k(
    attribution: &Attribution,
    feature_names: &[String],
    top_k: usize,
) -> Result<ExplanationSummary> {
    let n = attribution.contributions.len();
    if feature_names.len() != n || attribution.feature_values.len() != n {
        return Err(PlacementError::DimensionMismatch {
            context: "feature names".to_string(),
            expected: n,
            actual: feature_names.len(),
        });
    }

    let mut impacts: Vec<FeatureImpact> = feature_names
        .iter()
        .zip(attribution.feature_values.iter())
        .zip(attribution.contributions.iter())
        .map(|((name, &value), &contribution)| FeatureImpact {
            feature: display_name(name).to_string(),
            feature_key: name.clone(),
            value,
            shap_value: contribution,
            impact: Impact::of(contribution),
            abs_impact: contribution.abs(),
        })
        .collect();

    impacts.sort_by(|a, b| b.abs_impact.total_cmp(&a.abs_impact));

    let top = |impact: Impact| -> Vec<FeatureImpact> {
        impacts
            .iter()
            .filter(|f| f.impact == impact)
            .take(top_k)
            .cloned()
            .collect()
    };
    let top_positive_features = top(Impact::Positive);
    let top_negative_features = top(Impact::Negative);

    Ok(ExplanationSummary {
        base_value: attribution.base_value,
        prediction_value: attribution.predicted_value,
        feature_impacts: impacts,
        top_positive_features,
        top_negative_features,
    })
}

/// Distribution of contributions over a set of attributions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionStats {
    pub feature_names: Vec<String>,
    /// Mean absolute contribution per feature
    pub mean_abs: Vec<f64>,
    /// Mean signed contribution per feature
    pub mean: Vec<f64>,
    /// Population standard deviation per feature
    pub std: Vec<f64>,
    pub min: Vec<f64>,
    pub max: Vec<f64>,
}

impl ContributionStats {
    /// Summarize attributions that share one feature layout
    pub fn from_attributions(attributions: &[Attribution]) -> Result<Self> {
        let first = attributions.first().ok_or_else(|| {
            PlacementError::InvalidInput("no attributions to summarize".to_string())
        })?;
        let n_features = first.contributions.len();
        let n = attributions.len() as f64;

        let mut mean_abs = vec![0.0; n_features];
        let mut mean = vec![0.0; n_features];
        let mut min = vec![f64::INFINITY; n_features];
        let mut max = vec![f64::NEG_INFINITY; n_features];

        for attr in attributions {
            if attr.contributions.len() != n_features {
                return Err(PlacementError::DimensionMismatch {
                    context: "attribution batch".to_string(),
                    expected: n_features,
                    actual: attr.contributions.len(),
                });
            }
            for (i, &c) in attr.contributions.iter().enumerate() {
                mean_abs[i] += c.abs();
                mean[i] += c;
                min[i] = min[i].min(c);
                max[i] = max[i].max(c);
            }
        }

        for i in 0..n_features {
            mean_abs[i] /= n;
            mean[i] /= n;
        }

        let mut sum_sq = vec![0.0; n_features];
        for attr in attributions {
            for (i, &c) in attr.contributions.iter().enumerate() {
                sum_sq[i] += (c - mean[i]).powi(2);
            }
        }
        let std = sum_sq.into_iter().map(|s| (s / n).sqrt()).collect();

        Ok(Self {
            feature_names: first.feature_names.clone(),
            mean_abs,
            mean,
            std,
            min,
            max,
        })
    }
}

/// Global importance entry for one feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    /// Readable feature label
    pub feature: String,
    pub feature_key: String,
    /// Mean |contribution| over the background set
    pub importance: f64,
    /// 1 = most important
    pub rank: usize,
}

/// Rank features by a score, descending; ties keep the given order
pub fn rank_importance(feature_names: &[String], scores: &[f64]) -> Result<Vec<FeatureImportance>> {
    if feature_names.len() != scores.len() {
        return Err(PlacementError::DimensionMismatch {
            context: "importance scores".to_string(),
            expected: feature_names.len(),
            actual: scores.len(),
        });
    }

    let mut ranked: Vec<(usize, f64)> = scores.iter().copied().enumerate().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    Ok(ranked
        .into_iter()
        .enumerate()
        .map(|(position, (idx, importance))| FeatureImportance {
            feature: display_name(&feature_names[idx]).to_string(),
            feature_key: feature_names[idx].clone(),
            importance,
            rank: position + 1,
        })
        .collect())
}

/// Mean |contribution| of every feature over the background rows, ranked
pub fn global_importance(model: &LinearModel, background: &BackgroundDataset) -> Result<Vec<FeatureImportance>> {
    let explainer = LinearExplainer::new(model.clone(), background)?;
    explainer_importance(&explainer, background)
}

/// Global importance reusing an existing explainer
pub fn explainer_importance(
    explainer: &LinearExplainer,
    background: &BackgroundDataset,
) -> Result<Vec<FeatureImportance>> {
    let attributions = explainer.explain_batch(background.data())?;
    let stats = ContributionStats::from_attributions(&attributions)?;
    rank_importance(&stats.feature_names, &stats.mean_abs)
}
