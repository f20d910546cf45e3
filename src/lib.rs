//! Placement Insight - placement and salary prediction with exact explanations
//!
//! This crate provides:
//! - Encoding of raw student records into a fixed 15-feature layout
//! - Training of a logistic placement model and a linear salary model
//! - Closed-form SHAP attributions for both linear models
//! - Ranked per-student explanations and global feature importance
//! - A JSON REST server and a command-line interface
//!
//! # Modules
//!
//! - [`preprocessing`] - Record validation, label encoding, dataset loading
//! - [`synthetic`] - Seeded background population for attribution baselines
//! - [`explainability`] - Linear SHAP engine, aggregation and importance
//! - [`training`] - Model fitting, splitting and evaluation metrics
//! - [`inference`] - Model bundles, predictions and skill-gap analysis
//! - [`server`] - HTTP server with REST API
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Data
pub mod preprocessing;
pub mod synthetic;

// Models
pub mod explainability;
pub mod training;
pub mod inference;

// Services
pub mod server;
pub mod cli;

pub use error::{PlacementError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{PlacementError, Result};

    // Preprocessing
    pub use crate::preprocessing::{
        CategoryTables, FeatureEncoder, FeatureVector, PlacementDataset, StudentRecord, N_FEATURES,
    };

    // Background population
    pub use crate::synthetic::{generate_background, BackgroundDataset, BackgroundGenerator};

    // Explainability
    pub use crate::explainability::{
        aggregate, global_importance, Attribution, ExplainerConfig, ExplainerContext, ExplanationSummary,
        FeatureImpact, FeatureImportance, Impact, LinearExplainer, LinearModel, Link, ModelKind,
    };

    // Training
    pub use crate::training::{LinearRegression, LogisticRegression, ModelMetrics, PlacementTrainer, TrainingConfig};

    // Inference
    pub use crate::inference::{ModelBundle, PlacementPredictor, PredictionResponse, PredictorConfig};
}
