//! Lesson domain types and the parser for model output.

pub mod parser;
pub mod types;

pub use parser::{LessonParseError, parse_lesson, strip_code_fences};
pub use types::{AgeGroup, AgeGroupParseError, LessonIdea, Theme, ThemeError};
