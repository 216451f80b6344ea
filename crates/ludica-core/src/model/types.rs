//! Provider-neutral request and error types shared by all model backends.

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::lesson::{AgeGroup, Theme};
use crate::prompt;

/// A single structured-output request to a model backend.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Fixed behavioral instruction.
    pub system_instruction: String,
    /// User prompt embedding the theme and age group.
    pub prompt: String,
    /// Schema the response text must conform to.
    pub response_schema: Value,
}

impl GenerationRequest {
    /// Build the lesson request for a theme and age group.
    pub fn for_lesson(theme: &Theme, age: AgeGroup) -> Self {
        Self {
            system_instruction: prompt::SYSTEM_INSTRUCTION.to_string(),
            prompt: prompt::build_user_prompt(theme, age),
            response_schema: prompt::lesson_response_schema(),
        }
    }
}

/// Transport and service-side failures of a model backend.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("request to model service failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("model service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("model service response could not be decoded: {0}")]
    Envelope(#[source] serde_json::Error),

    #[error("model service blocked the prompt: {0}")]
    Blocked(String),

    #[error("model did not respond within {0:?}")]
    Timeout(Duration),

    #[error("{0}")]
    Other(String),
}
