//! Quiz generation pipeline: prompt construction, provider call, normalization.
//!
//! Generation and persistence are independent phases; this module never touches
//! a store. Exactly one provider call per request, no retries.

use chrono::Utc;
use tracing::{info, instrument};

use crate::clients::CompletionClient;
use crate::error::GenerateError;
use crate::normalize::normalize;
use crate::prompt::{build_system_prompt, build_user_prompt, QuizRequest};
use crate::quiz::Quiz;

/// Wraps a low-level completion client with schema-guided prompting and
/// resilient JSON normalization.
#[derive(Debug, Clone)]
pub struct QuizGenerator<C: CompletionClient> {
    client: C,
}

impl<C: CompletionClient> QuizGenerator<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Generate a quiz for the request. The requested count is advisory: the
    /// prompt demands it, and the normalizer validates shape rather than count.
    #[instrument(target = "dquest::generator", skip(self), fields(topic = %request.topic, count = request.count))]
    pub async fn generate(&self, request: &QuizRequest) -> Result<Quiz, GenerateError> {
        info!(target: "dquest::generator", "Starting quiz generation");

        let system = build_system_prompt(request.count, Utc::now().timestamp_millis());
        let user = build_user_prompt(&request.topic);

        let raw = self.client.complete(system, user).await?;
        let quiz = normalize(&raw, &request.topic)?;

        info!(
            target: "dquest::generator",
            title = %quiz.title,
            questions = quiz.questions.len(),
            "Quiz generation completed"
        );
        Ok(quiz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::MockClient;
    use crate::error::{CompletionError, NormalizeError};

    fn quiz_json(count: usize) -> String {
        let questions: Vec<String> = (0..count)
            .map(|i| {
                format!(
                    r#"{{"question":"Q{i}?","options":["a","b","c","d"],"correctIndex":{}}}"#,
                    i % 4
                )
            })
            .collect();
        format!(
            r#"{{"title":"Test Quiz","questions":[{}]}}"#,
            questions.join(",")
        )
    }

    #[tokio::test]
    async fn generates_requested_count() {
        let (client, handle) = MockClient::new();
        handle.push_text(quiz_json(3));
        let generator = QuizGenerator::new(client);

        let quiz = generator
            .generate(&QuizRequest::parse("3 questions about Ancient Rome"))
            .await
            .unwrap();
        assert_eq!(quiz.questions.len(), 3);

        let prompts = handle.prompts();
        assert!(prompts[0].0.contains("Generate exactly 3 questions"));
        assert!(prompts[0].1.contains("Ancient Rome"));
    }

    #[tokio::test]
    async fn provider_error_propagates() {
        let (client, handle) = MockClient::new();
        handle.push_error(CompletionError::RateLimit);
        let generator = QuizGenerator::new(client);

        let err = generator
            .generate(&QuizRequest::parse("anything"))
            .await
            .unwrap_err();
        assert!(matches!(err, GenerateError::Completion(CompletionError::RateLimit)));
    }

    #[tokio::test]
    async fn malformed_body_is_a_normalize_error() {
        let (client, handle) = MockClient::new();
        handle.push_text("Sorry, I cannot help with that.");
        let generator = QuizGenerator::new(client);

        let err = generator
            .generate(&QuizRequest::parse("anything"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GenerateError::Normalize(NormalizeError::Malformed(..))
        ));
    }
}
