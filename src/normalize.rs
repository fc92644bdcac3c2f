//! Turn raw provider text into a validated, canonical `Quiz`.

use chrono::Utc;
use tracing::{debug, instrument, warn};

use crate::error::NormalizeError;
use crate::json_text::{extract_first, strip_code_fences};
use crate::quiz::{Quiz, QuizMetadata};

pub const DEFAULT_GRADE: &str = "8";
pub const DEFAULT_DIFFICULTY: &str = "Medium";
pub const DEFAULT_EMOJI: &str = "🎯";

/// Ordered keyword -> emoji lookup, first match wins. A presentation heuristic,
/// not a correctness concern.
const TOPIC_EMOJI: &[(&str, &str)] = &[
    ("space", "🚀"),
    ("astronom", "🔭"),
    ("history", "📜"),
    ("rome", "🏛️"),
    ("science", "🔬"),
    ("chemi", "🧪"),
    ("biolog", "🧬"),
    ("physic", "⚛️"),
    ("math", "🔢"),
    ("geograph", "🌍"),
    ("computer", "💻"),
    ("tech", "💻"),
    ("music", "🎵"),
    ("art", "🎨"),
    ("sport", "⚽"),
    ("literat", "📚"),
    ("movie", "🎬"),
    ("film", "🎬"),
    ("animal", "🦁"),
];

/// Pick an emoji for the quiz from its topic and title.
pub fn emoji_for(text: &str) -> &'static str {
    let lower = text.to_lowercase();
    TOPIC_EMOJI
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, emoji)| *emoji)
        .unwrap_or(DEFAULT_EMOJI)
}

/// Clean, parse, and validate the raw model output.
///
/// `fallback_topic` seeds the synthesized metadata when the provider omitted it.
/// Structurally idempotent: normalizing the same raw text twice yields identical
/// quizzes apart from freshly generated ids.
#[instrument(target = "dquest::normalize", skip(raw), fields(raw_len = raw.len()))]
pub fn normalize(raw: &str, fallback_topic: &str) -> Result<Quiz, NormalizeError> {
    let cleaned = strip_code_fences(raw);
    debug!(target: "dquest::normalize", cleaned_len = cleaned.len(), "stripped code fences");

    let mut quiz: Quiz = match serde_json::from_str(cleaned) {
        Ok(quiz) => quiz,
        Err(e) => {
            // The payload may be buried in prose; scan for a balanced structure.
            match extract_first::<Quiz>(cleaned) {
                Some(quiz) => {
                    warn!(target: "dquest::normalize", "payload recovered from surrounding text");
                    quiz
                }
                None => {
                    let excerpt: String = cleaned.chars().take(200).collect();
                    return Err(NormalizeError::Malformed(e, excerpt));
                }
            }
        }
    };

    quiz.validate()?;

    if quiz.id.is_none() {
        quiz.id = Some(format!("quiz-{}", Utc::now().timestamp_millis()));
    }
    if quiz.metadata.is_none() {
        let scent = format!("{} {}", fallback_topic, quiz.title);
        quiz.metadata = Some(QuizMetadata {
            grade: DEFAULT_GRADE.to_string(),
            topic: fallback_topic.to_string(),
            difficulty: DEFAULT_DIFFICULTY.to_string(),
            emoji: emoji_for(&scent).to_string(),
        });
    }

    debug!(
        target: "dquest::normalize",
        title = %quiz.title,
        questions = quiz.questions.len(),
        "normalized quiz"
    );
    Ok(quiz)
}
