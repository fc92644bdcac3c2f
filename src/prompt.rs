//! Prompt construction for the completion provider.
//!
//! Deterministic for fixed inputs except for the millisecond id seed embedded in
//! the system prompt; never performs I/O.

use schemars::schema_for;

use crate::quiz::Quiz;

pub const DEFAULT_QUESTION_COUNT: u8 = 5;
pub const MIN_QUESTION_COUNT: u8 = 1;
pub const MAX_QUESTION_COUNT: u8 = 20;

/// A parsed generation request: the full query as topic plus a question count
/// extracted from a `"<N> questions"` pattern when present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizRequest {
    pub topic: String,
    pub count: u8,
}

impl QuizRequest {
    pub fn new(topic: impl Into<String>, count: Option<u8>) -> Self {
        Self {
            topic: topic.into(),
            count: clamp_count(count.unwrap_or(DEFAULT_QUESTION_COUNT)),
        }
    }

    /// Parse a free-text query such as `"10 questions about Space"`. The whole
    /// query is kept as the topic; only the count is extracted.
    pub fn parse(query: &str) -> Self {
        Self::new(query.trim(), extract_count(query))
    }
}

pub fn clamp_count(count: u8) -> u8 {
    count.clamp(MIN_QUESTION_COUNT, MAX_QUESTION_COUNT)
}

/// Look for a number immediately followed by "question"/"questions".
fn extract_count(query: &str) -> Option<u8> {
    let lower = query.to_lowercase();
    let tokens: Vec<&str> = lower.split_whitespace().collect();
    for (i, tok) in tokens.iter().enumerate() {
        let digits: String = tok.chars().take_while(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() {
            continue;
        }
        let rest = &tok[digits.len()..];
        let followed = if rest.is_empty() {
            tokens.get(i + 1).is_some_and(|t| t.starts_with("question"))
        } else {
            rest.starts_with("question")
        };
        if followed {
            if let Ok(n) = digits.parse::<u32>() {
                return Some(n.min(u8::MAX as u32) as u8);
            }
        }
    }
    None
}

/// System instruction fixing the exact JSON output shape.
///
/// Embeds both a literal example skeleton (seeded with `seed_millis` so ids stay
/// unique across runs) and the generated schema for the `Quiz` type.
pub fn build_system_prompt(count: u8, seed_millis: i64) -> String {
    let schema = schema_for!(Quiz);
    let schema_json = serde_json::to_string_pretty(&schema)
        .unwrap_or_else(|_| "{}".to_string());

    format!(
        r#"You are a Quiz JSON Generator.
The user will give a topic. You must output ONLY valid JSON.
No markdown formatting, no explanations, no prologue.
Structure:
{{
  "id": "unique-id-{seed_millis}",
  "title": "Topic Title",
  "metadata": {{ "grade": "8", "topic": "Topic", "difficulty": "Medium", "emoji": "🎯" }},
  "questions": [
    {{
      "question": "Question text?",
      "options": ["Option A", "Option B", "Option C", "Option D"],
      "correctIndex": 0
    }}
  ]
}}
Generate exactly {count} questions. Every question has exactly 4 options.
Ensure "correctIndex" is a number 0-3.
The output must match this JSON schema:
{schema_json}"#
    )
}

/// User message embedding the requested topic verbatim.
pub fn build_user_prompt(topic: &str) -> String {
    format!("Create a quiz based on this request: \"{topic}\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plain_topic_defaults_to_five() {
        let req = QuizRequest::parse("Ancient Rome");
        assert_eq!(req.topic, "Ancient Rome");
        assert_eq!(req.count, 5);
    }

    #[test]
    fn parse_count_pattern() {
        assert_eq!(QuizRequest::parse("10 questions about Space").count, 10);
        assert_eq!(QuizRequest::parse("give me 3 Questions on math").count, 3);
        assert_eq!(QuizRequest::parse("1 question about tea").count, 1);
    }

    #[test]
    fn count_is_clamped() {
        assert_eq!(QuizRequest::parse("50 questions about stars").count, 20);
        assert_eq!(QuizRequest::parse("0 questions about void").count, 1);
        assert_eq!(QuizRequest::new("x", Some(200)).count, 20);
    }

    #[test]
    fn unrelated_numbers_ignored() {
        assert_eq!(QuizRequest::parse("World War 2").count, 5);
        assert_eq!(QuizRequest::parse("Apollo 11 mission").count, 5);
    }

    #[test]
    fn system_prompt_fixes_shape() {
        let prompt = build_system_prompt(3, 1234);
        assert!(prompt.contains("Generate exactly 3 questions"));
        assert!(prompt.contains("unique-id-1234"));
        assert!(prompt.contains("correctIndex"));
    }

    #[test]
    fn user_prompt_embeds_topic() {
        assert_eq!(
            build_user_prompt("Ancient Rome"),
            "Create a quiz based on this request: \"Ancient Rome\""
        );
    }
}
