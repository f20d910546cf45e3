//! Error types for placement prediction and explanation

use thiserror::Error;

/// Result type alias for placement operations
pub type Result<T> = std::result::Result<T, PlacementError>;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum PlacementError {
    #[error("Unknown category for '{field}': '{value}' (expected one of: {expected})")]
    UnknownCategory {
        field: String,
        value: String,
        expected: String,
    },

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Dimension mismatch in {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    #[error("Explainer not initialized")]
    UninitializedExplainer,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl PlacementError {
    /// Whether the error was caused by the caller's input rather than by
    /// the loaded models or the process state.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PlacementError::UnknownCategory { .. }
                | PlacementError::MissingField(_)
                | PlacementError::InvalidInput(_)
        )
    }
}

impl From<polars::error::PolarsError> for PlacementError {
    fn from(err: polars::error::PolarsError) -> Self {
        PlacementError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for PlacementError {
    fn from(err: serde_json::Error) -> Self {
        PlacementError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for PlacementError {
    fn from(err: ndarray::ShapeError) -> Self {
        PlacementError::DataError(format!("invalid shape: {}", err))
    }
}
