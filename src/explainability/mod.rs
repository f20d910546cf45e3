//! Model explainability module
//!
//! Exact additive attributions for the two linear models:
//! - Closed-form linear SHAP against a background population
//! - Ranked per-prediction explanations with top positive / negative features
//! - Global importance as mean |contribution| over the background

mod aggregate;
mod context;
mod linear;

pub use aggregate::{
    aggregate, aggregate_top_k, explainer_importance, global_importance, rank_importance,
    ContributionStats, ExplanationSummary, FeatureImpact, FeatureImportance, Impact, DEFAULT_TOP_K,
};
pub use context::{ExplainerConfig, ExplainerContext, ModelKind};
pub use linear::{attribute, sigmoid, Attribution, LinearExplainer, LinearModel, Link};
