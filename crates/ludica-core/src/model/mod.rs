//! Model backend interface for lesson generation.
//!
//! This module defines the [`LessonModel`] trait that every backend
//! implements, the provider-neutral [`GenerationRequest`], and the
//! [`GeminiModel`] HTTP backend.
//!
//! # Architecture
//!
//! ```text
//! LessonGenerator
//!     |
//!     |   complete(credential, request) ---> &dyn LessonModel
//!     |                                           |
//!     |                               GeminiModel | ScriptedModel (tests)
//!     |                                           |
//!     v                                           v
//! parse_lesson(raw text) <-------------- Ok(String) / Err(ModelError)
//! ```

pub mod gemini;
pub mod trait_def;
pub mod types;

pub use gemini::GeminiModel;
pub use trait_def::LessonModel;
pub use types::{GenerationRequest, ModelError};
