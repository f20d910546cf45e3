//! Exact SHAP values for linear models
//!
//! For `f(x) = w·x + b` with independent features the Shapley value of
//! feature `i` against a background set is `w_i * (x_i - E[x_i])`, and the
//! base value is `E[f(X)] = w·E[X] + b`. Classifiers are explained on the
//! margin, before the logistic link.

use crate::error::{PlacementError, Result};
use crate::synthetic::BackgroundDataset;
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// Output link applied to the linear margin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Link {
    /// Regression: the margin is the output
    Identity,
    /// Binary classification: probability = sigmoid(margin)
    Logistic,
}

impl Link {
    /// Map a margin to the model's output scale
    pub fn apply(&self, margin: f64) -> f64 {
        match self {
            Link::Identity => margin,
            Link::Logistic => sigmoid(margin),
        }
    }
}

/// Numerically stable logistic function
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Trained linear model: weights, intercept and output link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    weights: Array1<f64>,
    intercept: f64,
    link: Link,
}

impl LinearModel {
    pub fn new(weights: Array1<f64>, intercept: f64, link: Link) -> Self {
        Self {
            weights,
            intercept,
            link,
        }
    }

    /// Linear regressor (identity link)
    pub fn regressor(weights: Array1<f64>, intercept: f64) -> Self {
        Self::new(weights, intercept, Link::Identity)
    }

    /// Binary logistic classifier
    pub fn classifier(weights: Array1<f64>, intercept: f64) -> Self {
        Self::new(weights, intercept, Link::Logistic)
    }

    pub fn weights(&self) -> &Array1<f64> {
        &self.weights
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn link(&self) -> Link {
        self.link
    }

    pub fn n_features(&self) -> usize {
        self.weights.len()
    }

    /// Raw linear score `w·x + b`
    pub fn margin(&self, x: ArrayView1<'_, f64>) -> Result<f64> {
        self.check_width("query", x.len())?;
        Ok(self.weights.dot(&x) + self.intercept)
    }

    /// Output after the link (probability for classifiers)
    pub fn predict(&self, x: ArrayView1<'_, f64>) -> Result<f64> {
        Ok(self.link.apply(self.margin(x)?))
    }

    /// Margins for every row of `x`
    pub fn margins(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.check_width("batch", x.ncols())?;
        Ok(x.dot(&self.weights) + self.intercept)
    }

    fn check_width(&self, context: &str, actual: usize) -> Result<()> {
        if actual != self.n_features() {
            return Err(PlacementError::DimensionMismatch {
                context: context.to_string(),
                expected: self.n_features(),
                actual,
            });
        }
        Ok(())
    }
}

/// Additive decomposition of one prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribution {
    /// Feature names, in model order
    pub feature_names: Vec<String>,
    /// Query values the contributions were computed for
    pub feature_values: Vec<f64>,
    /// Per-feature contribution on the margin scale
    pub contributions: Vec<f64>,
    /// Expected margin over the background set
    pub base_value: f64,
    /// `base_value + sum(contributions)`
    pub predicted_value: f64,
    /// Link of the explained model
    pub link: Link,
}

impl Attribution {
    /// Sum of all contributions
    pub fn sum_contributions(&self) -> f64 {
        self.contributions.iter().sum()
    }

    /// Contribution of a named feature
    pub fn contribution(&self, feature: &str) -> Option<f64> {
        self.feature_names
            .iter()
            .position(|name| name == feature)
            .map(|idx| self.contributions[idx])
    }

    /// Predicted value mapped through the link (probability for classifiers)
    pub fn predicted_output(&self) -> f64 {
        self.link.apply(self.predicted_value)
    }

    /// Whether `base + sum(contributions)` matches `expected` within a relative tolerance
    pub fn is_additive(&self, expected: f64, rel_tol: f64) -> bool {
        let total = self.base_value + self.sum_contributions();
        let scale = expected.abs().max(1.0);
        (total - expected).abs() <= rel_tol * scale
    }
}

/// Closed-form explainer for one linear model.
///
/// Background column means and the base value are computed once at
/// construction and reused for every query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearExplainer {
    model: LinearModel,
    feature_names: Vec<String>,
    means: Array1<f64>,
    base_value: f64,
}

impl LinearExplainer {
    /// Build an explainer from a model and its background set
    pub fn new(model: LinearModel, background: &BackgroundDataset) -> Result<Self> {
        if background.n_features() != model.n_features() {
            return Err(PlacementError::DimensionMismatch {
                context: "background".to_string(),
                expected: model.n_features(),
                actual: background.n_features(),
            });
        }

        let means = background.means();
        let base_value = model.weights().dot(&means) + model.intercept();

        Ok(Self {
            model,
            feature_names: background.feature_names().to_vec(),
            means,
            base_value,
        })
    }

    pub fn model(&self) -> &LinearModel {
        &self.model
    }

    /// Expected margin over the background set
    pub fn base_value(&self) -> f64 {
        self.base_value
    }

    /// Background column means
    pub fn means(&self) -> &Array1<f64> {
        &self.means
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Explain a single query vector
    pub fn attribute(&self, query: ArrayView1<'_, f64>) -> Result<Attribution> {
        if query.len() != self.model.n_features() {
            return Err(PlacementError::DimensionMismatch {
                context: "query".to_string(),
                expected: self.model.n_features(),
                actual: query.len(),
            });
        }

        let contributions: Vec<f64> = self
            .model
            .weights()
            .iter()
            .zip(query.iter())
            .zip(self.means.iter())
            .map(|((w, x), mean)| w * (x - mean))
            .collect();

        let predicted_value = self.base_value + contributions.iter().sum::<f64>();

        Ok(Attribution {
            feature_names: self.feature_names.clone(),
            feature_values: query.to_vec(),
            contributions,
            base_value: self.base_value,
            predicted_value,
            link: self.model.link(),
        })
    }

    /// Explain every row of a matrix
    pub fn explain_batch(&self, x: &Array2<f64>) -> Result<Vec<Attribution>> {
        x.rows().into_iter().map(|row| self.attribute(row)).collect()
    }
}

/// One-shot attribution: build the explainer and explain `query`
pub fn attribute(
    model: &LinearModel,
    background: &BackgroundDataset,
    query: ArrayView1<'_, f64>,
) -> Result<Attribution> {
    LinearExplainer::new(model.clone(), background)?.attribute(query)
}
