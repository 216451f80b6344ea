//! Parsing of raw model text into a [`LessonIdea`].
//!
//! The model is asked for bare JSON but sometimes wraps it in a markdown
//! code fence anyway. [`strip_code_fences`] removes one enclosing fence;
//! [`parse_lesson`] then decodes and validates the payload.

use thiserror::Error;

use super::types::{LessonIdea, RawLesson};

/// Errors produced when model output is not a usable lesson.
#[derive(Debug, Error)]
pub enum LessonParseError {
    #[error("model returned no text")]
    Empty,

    #[error("model text is not a valid lesson object: {0}")]
    Json(#[from] serde_json::Error),

    #[error("lesson field {0:?} is empty")]
    BlankField(&'static str),
}

/// Remove a single enclosing markdown code fence, if present.
///
/// Handles a leading "```" with an optional info string (e.g. "```json")
/// and a trailing "```". Text without a leading fence is returned trimmed
/// and otherwise untouched.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    let body = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        // Single-line fence: drop the info string only.
        None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
    };

    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

/// Decode and validate model output as a [`LessonIdea`].
pub fn parse_lesson(raw: &str) -> Result<LessonIdea, LessonParseError> {
    let cleaned = strip_code_fences(raw);
    if cleaned.is_empty() {
        return Err(LessonParseError::Empty);
    }

    let raw: RawLesson = serde_json::from_str(cleaned)?;
    LessonIdea::try_from(raw)
}
