//! POST /api/generate-quiz

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::api::{ApiError, AppState, DebugInfo};
use crate::generator::QuizGenerator;
use crate::prompt::QuizRequest;
use crate::quiz::Quiz;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub topic: String,
    pub count: Option<u8>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub quiz: Quiz,
    pub saved: bool,
    pub id: String,
}

/// Generate a quiz for the requested topic, then attempt one non-fatal save.
#[instrument(target = "dquest::api", skip(state, body))]
pub async fn generate_quiz(
    State(state): State<AppState>,
    body: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let Json(request) = body.map_err(|_| ApiError::Validation("Invalid JSON body".to_string()))?;

    let topic = request.topic.trim();
    if topic.is_empty() {
        return Err(ApiError::Validation("Topic is required".to_string()));
    }

    let debug = DebugInfo::from_config(&state.config);
    let Some(client) = state.client.as_ref().filter(|_| state.config.has_api_key()) else {
        // Checked before any upstream call is attempted.
        return Err(ApiError::Config(
            "Server Config Error: Missing API Key".to_string(),
            debug,
        ));
    };

    let quiz_request = QuizRequest::new(topic, request.count);
    let generator = QuizGenerator::new(client.clone());
    let quiz = generator
        .generate(&quiz_request)
        .await
        .map_err(|e| ApiError::Generate(e, debug))?;

    // Persistence is best-effort; a failed save never invalidates the quiz.
    let (saved, id) = if state.store.is_configured() {
        match state.store.save(topic, &quiz).await {
            Ok(record) => (true, record.id),
            Err(e) => {
                warn!(target: "dquest::api", error = %e, "quiz save failed");
                (false, ephemeral_id())
            }
        }
    } else {
        (false, ephemeral_id())
    };

    info!(target: "dquest::api", %id, saved, questions = quiz.questions.len(), "quiz generated");
    Ok(Json(GenerateResponse {
        success: true,
        quiz,
        saved,
        id,
    }))
}

/// Id handed out for quizzes that were generated but not persisted.
fn ephemeral_id() -> String {
    format!("ai-{}", Utc::now().timestamp_millis())
}
