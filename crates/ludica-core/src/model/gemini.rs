//! Google Gemini backend for [`LessonModel`].
//!
//! Uses the `generateContent` REST endpoint in JSON structured-output mode.
//! The credential travels in the `x-goog-api-key` header so it never shows
//! up in URLs or logs.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::credential::Credential;

use super::trait_def::LessonModel;
use super::types::{GenerationRequest, ModelError};

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini `generateContent` client.
///
/// Cheap to clone; the underlying HTTP connection pool is shared. Holds no
/// credential.
#[derive(Debug, Clone)]
pub struct GeminiModel {
    client: Client,
    endpoint: String,
    model: String,
    temperature: Option<f32>,
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    system_instruction: GeminiContent<'a>,
    contents: Vec<GeminiContent<'a>>,
    generation_config: GeminiGenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig<'a> {
    response_mime_type: &'a str,
    response_schema: &'a Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<GeminiPromptFeedback>,
    #[serde(default)]
    usage_metadata: Option<GeminiUsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiResponseContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    #[serde(default)]
    prompt_token_count: Option<u32>,
    #[serde(default)]
    candidates_token_count: Option<u32>,
    #[serde(default)]
    total_token_count: Option<u32>,
}

impl GeminiResponse {
    /// Concatenated text of the first candidate, or an empty string when
    /// the service produced no text.
    fn into_text(self) -> Result<String, ModelError> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(ModelError::Blocked(reason));
        }

        let Some(candidate) = self.candidates.into_iter().next() else {
            return Ok(String::new());
        };

        if let Some(reason) = candidate.finish_reason.as_deref() {
            if reason != "STOP" {
                warn!(finish_reason = reason, "model finished early");
            }
        }

        Ok(candidate
            .content
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

impl GeminiModel {
    /// Build a client from config.
    ///
    /// The HTTP client gets the configured timeout as a transport-level
    /// bound; the generator enforces its own deadline on top.
    pub fn new(config: &ClientConfig) -> Result<Self, ModelError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    /// Full URL of the `generateContent` call.
    pub fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_body<'a>(&self, request: &'a GenerationRequest) -> GeminiRequest<'a> {
        GeminiRequest {
            system_instruction: GeminiContent {
                role: None,
                parts: vec![GeminiPart {
                    text: &request.system_instruction,
                }],
            },
            contents: vec![GeminiContent {
                role: Some("user"),
                parts: vec![GeminiPart {
                    text: &request.prompt,
                }],
            }],
            generation_config: GeminiGenerationConfig {
                response_mime_type: "application/json",
                response_schema: &request.response_schema,
                temperature: self.temperature,
            },
        }
    }
}

#[async_trait]
impl LessonModel for GeminiModel {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn complete(
        &self,
        credential: &Credential,
        request: &GenerationRequest,
    ) -> Result<String, ModelError> {
        let url = self.url();
        debug!(url = %url, "sending generateContent request");

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, credential.expose())
            .json(&self.build_body(request))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "model service returned an error");
            return Err(ModelError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: GeminiResponse =
            serde_json::from_str(&body).map_err(ModelError::Envelope)?;

        if let Some(usage) = &envelope.usage_metadata {
            debug!(
                prompt_tokens = ?usage.prompt_token_count,
                response_tokens = ?usage.candidates_token_count,
                total_tokens = ?usage.total_token_count,
                "model usage"
            );
        }

        envelope.into_text()
    }
}
