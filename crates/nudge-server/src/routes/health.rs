//! Health check endpoint.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub classifier_configured: bool,
    pub model: Option<String>,
    pub version: String,
}

/// Health check endpoint.
/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        classifier_configured: state.is_configured(),
        model: state.model_name().map(str::to_string),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
