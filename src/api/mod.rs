//! HTTP API: three thin endpoints over the generation pipeline and store.

pub mod generate;
pub mod health;
pub mod save;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::clients::CompletionClient;
use crate::config::Config;
use crate::error::{CompletionError, GenerateError, NormalizeError, PersistError};
use crate::store::QuizStore;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Completion client, present only when an API key is configured.
    pub client: Option<Box<dyn CompletionClient>>,
    pub store: QuizStore,
}

impl AppState {
    pub fn new(config: Config, client: Option<Box<dyn CompletionClient>>, store: QuizStore) -> Self {
        Self {
            config: Arc::new(config),
            client,
            store,
        }
    }
}

/// Build the application router. CORS is wide open: the endpoints serve a
/// static browser frontend from arbitrary origins, and preflight OPTIONS
/// requests answer 200.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/generate-quiz", post(generate::generate_quiz))
        .route("/api/save-quiz", post(save::save_quiz))
        .route("/api/health", get(health::health_check))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Diagnostic block attached to generation failures, mirroring what operators
/// need to debug a misconfigured deployment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugInfo {
    pub key_configured: bool,
    pub key_length: usize,
    pub model: String,
    pub timestamp: DateTime<Utc>,
}

impl DebugInfo {
    pub fn from_config(config: &Config) -> Self {
        Self {
            key_configured: config.has_api_key(),
            key_length: config.api_key_length(),
            model: config
                .model
                .clone()
                .unwrap_or_else(|| crate::clients::cerebras::DEFAULT_MODEL.to_string()),
            timestamp: Utc::now(),
        }
    }
}

/// Handler-level error: everything is caught here and converted to a JSON body
/// with a stable `error` field; nothing propagates as an unhandled fault.
#[derive(Debug)]
pub enum ApiError {
    /// Bad client input.
    Validation(String),
    /// Server-side misconfiguration (missing credentials).
    Config(String, DebugInfo),
    /// Generation pipeline failure.
    Generate(GenerateError, DebugInfo),
    /// Persistence failure surfaced by the save endpoint.
    Persist(PersistError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, details, debug) = match self {
            ApiError::Validation(message) => (StatusCode::BAD_REQUEST, message, None, None),
            ApiError::Config(message, debug) => {
                (StatusCode::INTERNAL_SERVER_ERROR, message, None, Some(debug))
            }
            ApiError::Generate(err, debug) => {
                let (status, message, details) = map_generate_error(&err);
                (status, message, details, Some(debug))
            }
            ApiError::Persist(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DB Save Failed".to_string(),
                Some(err.to_string()),
                None,
            ),
        };

        let mut body = json!({ "error": error });
        if let Some(details) = details {
            body["details"] = json!(details);
        }
        if let Some(debug) = debug {
            body["debug"] = json!(debug);
        }
        (status, Json(body)).into_response()
    }
}

/// Map pipeline failures to HTTP statuses: provider statuses pass through,
/// timeouts invite a retry, non-conforming output is an internal error.
fn map_generate_error(err: &GenerateError) -> (StatusCode, String, Option<String>) {
    match err {
        GenerateError::Completion(e) => match e {
            CompletionError::MissingKey(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server Config Error: Missing API Key".to_string(),
                None,
            ),
            CompletionError::Timeout(secs) => (
                StatusCode::GATEWAY_TIMEOUT,
                format!("The AI service did not answer within {secs}s. Please try again."),
                None,
            ),
            CompletionError::Http(details) => (
                StatusCode::BAD_GATEWAY,
                "Could not reach the AI service".to_string(),
                Some(details.clone()),
            ),
            CompletionError::Upstream { status, body } => (
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                format!("Cerebras API Error ({status})"),
                Some(excerpt(body)),
            ),
            other => (
                StatusCode::from_u16(other.upstream_status().unwrap_or(502))
                    .unwrap_or(StatusCode::BAD_GATEWAY),
                other.to_string(),
                None,
            ),
        },
        GenerateError::Normalize(e) => {
            let message = match e {
                NormalizeError::Malformed(..) => {
                    "The AI returned invalid JSON. Please try again.".to_string()
                }
                NormalizeError::Schema(detail) => {
                    format!("The AI returned an incomplete quiz ({detail}). Please try again.")
                }
            };
            (StatusCode::INTERNAL_SERVER_ERROR, message, Some(e.to_string()))
        }
    }
}

/// First 200 chars of an upstream body, for diagnostics without log flooding.
fn excerpt(body: &str) -> String {
    body.chars().take(200).collect()
}
