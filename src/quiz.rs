//! Canonical quiz data model.
//!
//! A `Quiz` is created transiently by the generation pipeline, optionally persisted
//! (gaining a durable id and `created_at`), then consumed read-only by the player.
//! The only mutation after creation is default-metadata backfill at normalization.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::NormalizeError;

/// Number of answer options every question carries.
pub const OPTIONS_PER_QUESTION: usize = 4;

/// A titled set of multiple-choice questions with answer keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Quiz {
    /// Provider- or normalizer-assigned id; durable ids come from persistence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Absent titles deserialize as empty and are rejected by `validate`.
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<QuizMetadata>,
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// Descriptive metadata, backfilled by the normalizer when the provider omits it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct QuizMetadata {
    pub grade: String,
    pub topic: String,
    pub difficulty: String,
    pub emoji: String,
}

/// One multiple-choice question. Exactly four options; the answer key indexes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Question {
    pub question: String,
    pub options: Vec<String>,
    #[serde(rename = "correctIndex")]
    pub correct_index: usize,
}

/// Persisted row shape: one quiz per row, content stored as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredQuizRecord {
    pub id: String,
    pub topic: String,
    pub content: Quiz,
    pub created_at: DateTime<Utc>,
}

impl Quiz {
    /// Check the structural invariants: at least one question, exactly four options
    /// per question, and an in-range answer key.
    pub fn validate(&self) -> Result<(), NormalizeError> {
        if self.title.trim().is_empty() {
            return Err(NormalizeError::Schema("missing quiz title".to_string()));
        }
        if self.questions.is_empty() {
            return Err(NormalizeError::Schema("quiz has no questions".to_string()));
        }
        for (i, q) in self.questions.iter().enumerate() {
            if q.question.trim().is_empty() {
                return Err(NormalizeError::Schema(format!("question {} has no text", i + 1)));
            }
            if q.options.len() != OPTIONS_PER_QUESTION {
                return Err(NormalizeError::Schema(format!(
                    "question {} has {} options, expected {}",
                    i + 1,
                    q.options.len(),
                    OPTIONS_PER_QUESTION
                )));
            }
            if q.correct_index >= OPTIONS_PER_QUESTION {
                return Err(NormalizeError::Schema(format!(
                    "question {} has correctIndex {}, expected 0-{}",
                    i + 1,
                    q.correct_index,
                    OPTIONS_PER_QUESTION - 1
                )));
            }
        }
        Ok(())
    }
}

impl StoredQuizRecord {
    /// Wrap a freshly generated quiz as a record with the given id.
    pub fn new(id: impl Into<String>, topic: impl Into<String>, content: Quiz) -> Self {
        Self {
            id: id.into(),
            topic: topic.into(),
            content,
            created_at: Utc::now(),
        }
    }
}
