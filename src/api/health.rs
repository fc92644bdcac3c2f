//! GET /api/health

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::api::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub has_api_key: bool,
    pub api_key_length: usize,
    pub persistence: String,
    pub version: String,
}

/// Deployment diagnostics: reports whether credentials are present without
/// revealing them.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    debug!(target: "dquest::api", "health check");
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now(),
        has_api_key: state.config.has_api_key(),
        api_key_length: state.config.api_key_length(),
        persistence: state.store.backend_name().to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
