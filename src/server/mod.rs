//! Placement Insight server module
//!
//! JSON REST API over a loaded model bundle: predictions, per-student
//! explanations and global feature importance.

mod api;
mod error;
mod handlers;
mod state;

pub use api::create_router;
pub use error::ServerError;
pub use state::AppState;

use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

use crate::inference::{PlacementPredictor, PredictorConfig};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Model bundle loaded at startup
    pub model_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            model_path: std::env::var("MODEL_PATH")
                .unwrap_or_else(|_| "./models/bundle.json".to_string()),
        }
    }
}

impl ServerConfig {
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_model_path(mut self, path: impl Into<String>) -> Self {
        self.model_path = path.into();
        self
    }
}

/// Load the bundle and serve until ctrl+c.
///
/// A bundle that fails to load is logged and the server starts without
/// models, answering 503 on model endpoints.
pub async fn run_server(config: ServerConfig, predictor_config: PredictorConfig) -> anyhow::Result<()> {
    let start_time = chrono::Utc::now();

    let predictor = match PlacementPredictor::load(&config.model_path, predictor_config) {
        Ok(predictor) => Some(predictor),
        Err(e) => {
            warn!(
                model_path = %config.model_path,
                error = %e,
                "Model bundle not loaded, serving without models"
            );
            None
        }
    };

    let state = Arc::new(AppState::new(predictor));
    info!(
        models_loaded = state.models_loaded(),
        explanations = state.explanations_enabled(),
        "Application state ready"
    );
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        address = %addr,
        started_at = %start_time.to_rfc3339(),
        pid = std::process::id(),
        "Placement Insight server listening"
    );
    info!(url = %format!("http://{}/api/health", addr), "Health endpoint available");

    let shutdown_signal = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for ctrl+c");
            std::future::pending::<()>().await;
        }
        let uptime = chrono::Utc::now().signed_duration_since(start_time);
        info!(uptime_secs = uptime.num_seconds(), "Shutdown signal received, stopping server");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shut down cleanly");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_overrides() {
        let config = ServerConfig::default()
            .with_host("127.0.0.1")
            .with_port(9000)
            .with_model_path("bundle.json");
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9000);
        assert_eq!(config.model_path, "bundle.json");
    }
}
