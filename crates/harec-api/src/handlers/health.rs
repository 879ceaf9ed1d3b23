//! Health check handlers.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
    /// Whether the feature extractor model is loaded
    pub model_loaded: bool,
}

/// Health check endpoint (liveness probe).
///
/// Reports healthy while the model is still loading; requests made before
/// it is ready fall back to the filename heuristic.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
        model_loaded: state.recognizer.extractor().is_ready(),
    })
}
