//! Training configuration

use crate::error::{PlacementError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for fitting the placement and salary models
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Fraction of rows held out for evaluation
    pub test_size: f64,

    /// Seed for the train/test shuffle
    pub random_seed: u64,

    /// L2 penalty for the placement classifier
    pub logistic_alpha: f64,

    /// Gradient descent iterations for the placement classifier
    pub logistic_max_iter: usize,

    /// Gradient descent step size (on standardized features)
    pub logistic_learning_rate: f64,

    /// Ridge term for the salary regressor; the derived features are
    /// linear combinations of the raw ones, so this must stay positive
    pub ridge_alpha: f64,

    /// Weight classes inversely to their frequency
    pub balanced_classes: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            random_seed: 42,
            logistic_alpha: 1e-3,
            logistic_max_iter: 2000,
            logistic_learning_rate: 0.5,
            ridge_alpha: 1e-3,
            balanced_classes: true,
        }
    }
}

impl TrainingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the held-out fraction
    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    /// Builder method to set the split seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    /// Builder method to configure gradient descent
    pub fn with_logistic(mut self, alpha: f64, max_iter: usize, learning_rate: f64) -> Self {
        self.logistic_alpha = alpha;
        self.logistic_max_iter = max_iter;
        self.logistic_learning_rate = learning_rate;
        self
    }

    pub fn with_ridge_alpha(mut self, alpha: f64) -> Self {
        self.ridge_alpha = alpha;
        self
    }

    pub fn with_balanced_classes(mut self, balanced: bool) -> Self {
        self.balanced_classes = balanced;
        self
    }

    /// Reject settings the trainer cannot run with
    pub fn validate(&self) -> Result<()> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(PlacementError::ConfigError(format!(
                "test_size must be in (0, 1), got {}",
                self.test_size
            )));
        }
        if self.logistic_max_iter == 0 || self.logistic_learning_rate <= 0.0 {
            return Err(PlacementError::ConfigError(
                "logistic regression needs positive iterations and learning rate".to_string(),
            ));
        }
        if self.logistic_alpha < 0.0 || self.ridge_alpha < 0.0 {
            return Err(PlacementError::ConfigError(
                "regularization strengths must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}
