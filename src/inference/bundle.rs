//! Serialized model bundle

use crate::error::{PlacementError, Result};
use crate::explainability::{LinearModel, Link};
use crate::preprocessing::{feature_names, CategoryTables, FeatureEncoder, N_FEATURES};
use crate::training::ModelMetrics;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Bundle layout version written by this crate
pub const BUNDLE_FORMAT_VERSION: u32 = 1;

/// Everything prediction and explanation need, in one JSON document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelBundle {
    pub format_version: u32,
    pub created_at: DateTime<Utc>,
    /// Feature names in model order
    pub feature_names: Vec<String>,
    /// Label tables the models were fit with
    pub categories: CategoryTables,
    /// Placement classifier (logistic link)
    pub placement: LinearModel,
    /// Salary regressor (identity link)
    pub salary: LinearModel,
    #[serde(default)]
    pub placement_metrics: Option<ModelMetrics>,
    #[serde(default)]
    pub salary_metrics: Option<ModelMetrics>,
}

impl ModelBundle {
    /// Assemble and validate a bundle
    pub fn new(categories: CategoryTables, placement: LinearModel, salary: LinearModel) -> Result<Self> {
        let bundle = Self {
            format_version: BUNDLE_FORMAT_VERSION,
            created_at: Utc::now(),
            feature_names: feature_names(),
            categories,
            placement,
            salary,
            placement_metrics: None,
            salary_metrics: None,
        };
        bundle.validate()?;
        Ok(bundle)
    }

    /// Attach held-out metrics
    pub fn with_metrics(mut self, placement: ModelMetrics, salary: ModelMetrics) -> Self {
        self.placement_metrics = Some(placement);
        self.salary_metrics = Some(salary);
        self
    }

    /// Check the version, the feature layout and both models
    pub fn validate(&self) -> Result<()> {
        if self.format_version != BUNDLE_FORMAT_VERSION {
            return Err(PlacementError::SerializationError(format!(
                "unsupported bundle format version {} (expected {})",
                self.format_version, BUNDLE_FORMAT_VERSION
            )));
        }
        if self.feature_names != feature_names() {
            return Err(PlacementError::DimensionMismatch {
                context: "bundle feature names".to_string(),
                expected: N_FEATURES,
                actual: self.feature_names.len(),
            });
        }
        for (name, model, link) in [
            ("placement", &self.placement, Link::Logistic),
            ("salary", &self.salary, Link::Identity),
        ] {
            if model.n_features() != N_FEATURES {
                return Err(PlacementError::DimensionMismatch {
                    context: format!("{} model weights", name),
                    expected: N_FEATURES,
                    actual: model.n_features(),
                });
            }
            if model.link() != link {
                return Err(PlacementError::ConfigError(format!(
                    "{} model has link {:?}, expected {:?}",
                    name,
                    model.link(),
                    link
                )));
            }
        }
        Ok(())
    }

    /// Encoder over the bundle's category tables
    pub fn encoder(&self) -> FeatureEncoder {
        FeatureEncoder::new(self.categories.clone())
    }

    /// Write the bundle as pretty JSON, creating parent directories
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        info!(path = %path.display(), "Model bundle saved");
        Ok(())
    }

    /// Read and validate a bundle
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let bundle: Self = serde_json::from_str(&json)?;
        bundle.validate()?;
        info!(
            path = %path.display(),
            created_at = %bundle.created_at,
            "Model bundle loaded"
        );
        Ok(bundle)
    }
}
