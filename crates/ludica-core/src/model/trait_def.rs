//! The `LessonModel` trait -- the adapter interface for model backends.
//!
//! The trait is object-safe so the generator can hold an
//! `Arc<dyn LessonModel>` and swap backends in tests.

use async_trait::async_trait;

use crate::credential::Credential;

use super::types::{GenerationRequest, ModelError};

/// A generative model that answers a structured-output request with raw text.
///
/// Implementors send exactly one request per call and never retry. The
/// returned text is the model's answer as-is; validation happens in
/// [`crate::lesson::parse_lesson`].
#[async_trait]
pub trait LessonModel: Send + Sync {
    /// Human-readable backend name (e.g. "gemini").
    fn name(&self) -> &str;

    /// Send `request` authenticated with `credential` and return the
    /// response text.
    async fn complete(
        &self,
        credential: &Credential,
        request: &GenerationRequest,
    ) -> Result<String, ModelError>;
}

// Compile-time assertion: LessonModel must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn LessonModel) {}
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lesson::{AgeGroup, Theme};

    /// Echoes the prompt back, proving the trait works as `dyn LessonModel`.
    struct EchoModel;

    #[async_trait]
    impl LessonModel for EchoModel {
        fn name(&self) -> &str {
            "echo"
        }

        async fn complete(
            &self,
            _credential: &Credential,
            request: &GenerationRequest,
        ) -> Result<String, ModelError> {
            Ok(request.prompt.clone())
        }
    }

    #[tokio::test]
    async fn model_is_object_safe_and_callable() {
        let model: Box<dyn LessonModel> = Box::new(EchoModel);
        assert_eq!(model.name(), "echo");

        let cred = Credential::new("k").unwrap();
        let req = GenerationRequest::for_lesson(&Theme::new("Água").unwrap(), AgeGroup::Nursery);
        let text = model.complete(&cred, &req).await.unwrap();
        assert!(text.contains("Água"));
    }
}
