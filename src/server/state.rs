//! Application state management

use std::sync::Arc;

use crate::inference::PlacementPredictor;

use super::error::{Result, ServerError};

/// Application state shared across handlers.
///
/// The predictor is loaded once at startup; `None` means the service runs
/// without models and every model endpoint answers 503.
pub struct AppState {
    predictor: Option<Arc<PlacementPredictor>>,
}

impl AppState {
    pub fn new(predictor: Option<PlacementPredictor>) -> Self {
        Self {
            predictor: predictor.map(Arc::new),
        }
    }

    pub fn models_loaded(&self) -> bool {
        self.predictor.is_some()
    }

    pub fn explanations_enabled(&self) -> bool {
        self.predictor
            .as_ref()
            .is_some_and(|p| p.explanations_enabled())
    }

    /// The loaded predictor, or a 503
    pub fn predictor(&self) -> Result<Arc<PlacementPredictor>> {
        self.predictor.clone().ok_or_else(|| {
            ServerError::Unavailable("Models not loaded. Train a model bundle first.".to_string())
        })
    }
}
