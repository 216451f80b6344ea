//! Lesson idea generation for early-childhood educators.
//!
//! The crate turns a free-text theme and an [`AgeGroup`] into a validated
//! [`LessonIdea`] by asking an external generative model for structured
//! output. The interactive flow around a single request lives in [`demo`].
//!
//! ```text
//! DemoSession::begin --PendingRequest--> LessonGenerator::generate_with_cancel
//!                                              |
//!                      CredentialSource::lookup (per call)
//!                                              |
//!                      LessonModel::complete --raw text--> lesson::parse_lesson
//!                                              |
//! DemoSession::complete <--Result<LessonIdea, GenerateError>--+
//! ```

pub mod config;
pub mod credential;
pub mod demo;
pub mod error;
pub mod generate;
pub mod lesson;
pub mod model;
pub mod prompt;

pub use config::ClientConfig;
pub use credential::{Credential, CredentialSource, EnvCredentials};
pub use demo::{DemoSession, RequestState};
pub use error::{ErrorKind, GenerateError};
pub use generate::LessonGenerator;
pub use lesson::{AgeGroup, LessonIdea, Theme};
pub use model::{GeminiModel, GenerationRequest, LessonModel, ModelError};
