//! Inference module
//!
//! Serves predictions from a trained [`ModelBundle`]:
//! - Placement probability and decision
//! - Salary estimate with a floor and a ±10% band
//! - Rule-based skill-gap analysis
//! - Optional explanations through a shared explainer context

mod bundle;
mod predictor;
mod skills;

pub use bundle::{ModelBundle, BUNDLE_FORMAT_VERSION};
pub use predictor::{
    PlacementPredictor, PlacementResult, PredictionExplanations, PredictionResponse, PredictorConfig,
    SalaryRange, SalaryResult,
};
pub use skills::{analyze_skill_gaps, Priority, SkillAnalysis, SkillGap};
