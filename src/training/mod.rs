//! Model training module
//!
//! Fits the two fixed models of the placement service:
//! - L2 logistic regression for the placement outcome
//! - Ridge-stabilized least squares for the salary of placed students

mod config;
mod engine;
mod metrics;
pub mod linear_models;

pub use config::TrainingConfig;
pub use engine::{train_test_split, PlacementTrainer, SplitIndices};
pub use linear_models::{LinearRegression, LogisticRegression};
pub use metrics::{ConfusionMatrix, ModelMetrics};
