//! HTTP request handlers

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::explainability::ModelKind;
use crate::preprocessing::StudentRecord;

use super::error::Result;
use super::state::AppState;

/// Service banner with the endpoint list
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Placement Insight API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/api/health",
            "predict": "/api/predict (POST)",
            "explain": "/api/explain/{placement|salary} (POST)",
            "model_info": "/api/model-info",
            "feature_importance": "/api/feature-importance/{placement|salary}",
        }
    }))
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    let models_loaded = state.models_loaded();
    Json(json!({
        "status": if models_loaded { "healthy" } else { "models_not_loaded" },
        "models_loaded": models_loaded,
        "explanations_enabled": state.explanations_enabled(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Complete prediction for one student
pub async fn predict(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<Json<Value>> {
    let predictor = state.predictor()?;
    let response = predictor.predict_json(&body)?;
    info!(
        probability = response.placement.probability,
        placed = response.placement.placed,
        explained = response.explanations.is_some(),
        "Prediction served"
    );
    Ok(Json(json!(response)))
}

/// Ranked explanation of one model's output for one student
pub async fn explain(
    State(state): State<Arc<AppState>>,
    Path(model_type): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>> {
    let predictor = state.predictor()?;
    let kind: ModelKind = model_type.parse()?;
    let record = StudentRecord::from_json(&body)?;
    let explanation = predictor.explain(kind, &record)?;
    debug!(model_type = %kind, base_value = explanation.base_value, "Explanation served");
    Ok(Json(json!({
        "model_type": kind,
        "explanation": explanation,
    })))
}

pub async fn model_info(State(state): State<Arc<AppState>>) -> Result<Json<Value>> {
    let predictor = state.predictor()?;
    let bundle = predictor.bundle();
    Ok(Json(json!({
        "placement_model": "Logistic Regression",
        "salary_model": "Linear Regression",
        "model_types": ModelKind::ALL,
        "features": bundle.feature_names,
        "feature_count": bundle.feature_names.len(),
        "explanations_enabled": predictor.explanations_enabled(),
        "created_at": bundle.created_at,
        "placement_metrics": bundle.placement_metrics,
        "salary_metrics": bundle.salary_metrics,
    })))
}

/// Global importance ranking over the background population
pub async fn feature_importance(
    State(state): State<Arc<AppState>>,
    Path(model_type): Path<String>,
) -> Result<Json<Value>> {
    let predictor = state.predictor()?;
    let kind: ModelKind = model_type.parse()?;
    let importance = predictor.global_importance(kind)?;
    Ok(Json(json!({
        "model_type": kind,
        "feature_importance": importance,
    })))
}
