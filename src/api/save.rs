//! POST /api/save-quiz

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::api::{ApiError, AppState};
use crate::quiz::{Question, Quiz};

#[derive(Debug, Deserialize)]
pub struct SaveRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub questions: Vec<Question>,
}

#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub success: bool,
    pub id: String,
}

/// Persist a manually assembled quiz through the configured backend.
#[instrument(target = "dquest::api", skip(state, body))]
pub async fn save_quiz(
    State(state): State<AppState>,
    body: Result<Json<SaveRequest>, JsonRejection>,
) -> Result<Json<SaveResponse>, ApiError> {
    let Json(request) = body.map_err(|_| ApiError::Validation("Invalid JSON body".to_string()))?;

    if request.title.trim().is_empty() {
        return Err(ApiError::Validation("Title is required".to_string()));
    }
    if request.questions.is_empty() {
        return Err(ApiError::Validation("At least one question is required".to_string()));
    }

    let quiz = Quiz {
        id: None,
        title: request.title.clone(),
        metadata: None,
        questions: request.questions,
    };

    let record = state
        .store
        .save(&request.title, &quiz)
        .await
        .map_err(ApiError::Persist)?;

    info!(target: "dquest::api", id = %record.id, "quiz saved");
    Ok(Json(SaveResponse {
        success: true,
        id: record.id,
    }))
}
