//! The lesson generation call: credential check, one model request under a
//! deadline, then parsing and validation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::credential::CredentialSource;
use crate::error::GenerateError;
use crate::lesson::{self, AgeGroup, LessonIdea, Theme};
use crate::model::{GeminiModel, GenerationRequest, LessonModel, ModelError};

/// Generates lesson ideas through a [`LessonModel`].
///
/// Cloning is cheap; clones share the backend and credential source.
#[derive(Clone)]
pub struct LessonGenerator {
    model: Arc<dyn LessonModel>,
    credentials: Arc<dyn CredentialSource>,
    timeout: Duration,
}

impl LessonGenerator {
    pub fn new(
        model: impl LessonModel + 'static,
        credentials: impl CredentialSource + 'static,
    ) -> Self {
        Self {
            model: Arc::new(model),
            credentials: Arc::new(credentials),
            timeout: Duration::from_secs(ClientConfig::DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Gemini backend with environment credentials, both taken from `config`.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ModelError> {
        let model = GeminiModel::new(config)?;
        Ok(Self::new(model, config.credentials()).with_timeout(config.timeout))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Generate a lesson idea. Equivalent to [`Self::generate_with_cancel`]
    /// with a token that is never cancelled.
    pub async fn generate(&self, theme: &Theme, age: AgeGroup) -> Result<LessonIdea, GenerateError> {
        self.generate_with_cancel(theme, age, &CancellationToken::new())
            .await
    }

    /// Generate a lesson idea, giving up early if `cancel` fires.
    ///
    /// The credential is looked up first; when it is missing the call fails
    /// with [`GenerateError::MissingCredential`] without contacting the model.
    /// Exactly one model request is made otherwise.
    pub async fn generate_with_cancel(
        &self,
        theme: &Theme,
        age: AgeGroup,
        cancel: &CancellationToken,
    ) -> Result<LessonIdea, GenerateError> {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "generate",
            request_id = %request_id,
            model = self.model.name(),
            age = age.key(),
        );

        let result = self.run(theme, age, cancel).instrument(span).await;
        if let Err(e) = &result {
            if !matches!(e, GenerateError::Cancelled | GenerateError::MalformedResponse(_)) {
                tracing::warn!(request_id = %request_id, kind = %e.kind(), error = %e, "generation failed");
            }
        }
        result
    }

    async fn run(
        &self,
        theme: &Theme,
        age: AgeGroup,
        cancel: &CancellationToken,
    ) -> Result<LessonIdea, GenerateError> {
        let credential = self
            .credentials
            .lookup()
            .ok_or_else(|| GenerateError::MissingCredential {
                expected: self.credentials.describe(),
            })?;

        let request = GenerationRequest::for_lesson(theme, age);
        let started = Instant::now();

        let raw = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!("generation cancelled");
                return Err(GenerateError::Cancelled);
            }
            outcome = tokio::time::timeout(self.timeout, self.model.complete(&credential, &request)) => {
                match outcome {
                    Ok(result) => result?,
                    Err(_) => return Err(ModelError::Timeout(self.timeout).into()),
                }
            }
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match lesson::parse_lesson(&raw) {
            Ok(idea) => {
                tracing::info!(elapsed_ms, title = idea.title(), "lesson generated");
                Ok(idea)
            }
            Err(e) => {
                tracing::warn!(elapsed_ms, error = %e, "model returned a malformed lesson");
                Err(e.into())
            }
        }
    }
}

impl std::fmt::Debug for LessonGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LessonGenerator")
            .field("model", &self.model.name())
            .field("credentials", &self.credentials.describe())
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::credential::Credential;
    use crate::error::ErrorKind;

    const LESSON: &str = r#"{"title":"Chuva de Cores","objective":"Reconhecer cores","materials":["Papel crepom"],"steps":["Molhe o papel","Observe as cores"],"tips":"Use aventais."}"#;

    struct FixedModel {
        reply: fn() -> Result<String, ModelError>,
        delay: Duration,
        calls: Arc<AtomicUsize>,
    }

    impl FixedModel {
        fn new(reply: fn() -> Result<String, ModelError>) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    reply,
                    delay: Duration::ZERO,
                    calls: calls.clone(),
                },
                calls,
            )
        }
    }

    #[async_trait]
    impl LessonModel for FixedModel {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn complete(
            &self,
            _credential: &Credential,
            _request: &GenerationRequest,
        ) -> Result<String, ModelError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            (self.reply)()
        }
    }

    struct Key(Option<&'static str>);

    impl CredentialSource for Key {
        fn lookup(&self) -> Option<Credential> {
            self.0.and_then(Credential::new)
        }

        fn describe(&self) -> String {
            "test key".to_string()
        }
    }

    fn theme() -> Theme {
        Theme::new("Chuva").unwrap()
    }

    #[tokio::test]
    async fn success_returns_parsed_lesson() {
        let (model, calls) = FixedModel::new(|| Ok(LESSON.to_string()));
        let generator = LessonGenerator::new(model, Key(Some("k")));

        let lesson = generator.generate(&theme(), AgeGroup::Toddler).await.unwrap();
        assert_eq!(lesson.title(), "Chuva de Cores");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_credential_skips_model() {
        let (model, calls) = FixedModel::new(|| Ok(LESSON.to_string()));
        let generator = LessonGenerator::new(model, Key(None));

        let err = generator.generate(&theme(), AgeGroup::Toddler).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingCredential);
        assert!(err.to_string().contains("test key"), "unexpected: {err}");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn service_error_is_classified() {
        let (model, _) = FixedModel::new(|| {
            Err(ModelError::Status {
                status: 500,
                body: "internal".into(),
            })
        });
        let generator = LessonGenerator::new(model, Key(Some("k")));

        let err = generator.generate(&theme(), AgeGroup::Nursery).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NetworkOrService);
    }

    #[tokio::test]
    async fn unparseable_text_is_malformed() {
        let (model, _) = FixedModel::new(|| Ok("Desculpe, não posso ajudar".to_string()));
        let generator = LessonGenerator::new(model, Key(Some("k")));

        let err = generator.generate(&theme(), AgeGroup::Preschool).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_model_times_out() {
        let (mut model, _) = FixedModel::new(|| Ok(LESSON.to_string()));
        model.delay = Duration::from_secs(60);
        let generator =
            LessonGenerator::new(model, Key(Some("k"))).with_timeout(Duration::from_secs(5));

        let err = generator.generate(&theme(), AgeGroup::Toddler).await.unwrap_err();
        assert!(
            matches!(err, GenerateError::Service(ModelError::Timeout(d)) if d == Duration::from_secs(5)),
            "got {err:?}"
        );
    }

    #[tokio::test]
    async fn cancelled_token_aborts_before_reply() {
        let (mut model, calls) = FixedModel::new(|| Ok(LESSON.to_string()));
        model.delay = Duration::from_secs(60);
        let generator = LessonGenerator::new(model, Key(Some("k")));

        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = generator
            .generate_with_cancel(&theme(), AgeGroup::Toddler, &cancel)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cancelled);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn debug_hides_credentials() {
        let (model, _) = FixedModel::new(|| Ok(String::new()));
        let generator = LessonGenerator::new(model, Key(Some("secret-value")));
        let dbg = format!("{generator:?}");
        assert!(dbg.contains("fixed"));
        assert!(!dbg.contains("secret-value"));
    }
}
