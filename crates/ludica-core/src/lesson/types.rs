use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::parser::LessonParseError;

// ---------------------------------------------------------------------------
// Age group
// ---------------------------------------------------------------------------

/// Developmental band the generated activity is tailored to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeGroup {
    /// Berçário, 0 to 1 year.
    Nursery,
    /// Maternal, 2 to 3 years.
    #[default]
    Toddler,
    /// Pré-escola, 4 to 5 years.
    Preschool,
}

impl AgeGroup {
    /// All age groups in selector order.
    pub const ALL: [AgeGroup; 3] = [Self::Nursery, Self::Toddler, Self::Preschool];

    /// Label shown in the selector and substituted into the prompt.
    pub fn label(self) -> &'static str {
        match self {
            Self::Nursery => "Berçário (0-1 ano)",
            Self::Toddler => "Maternal (2-3 anos)",
            Self::Preschool => "Pré-escola (4-5 anos)",
        }
    }

    /// Short ASCII key accepted on the command line.
    pub fn key(self) -> &'static str {
        match self {
            Self::Nursery => "nursery",
            Self::Toddler => "toddler",
            Self::Preschool => "preschool",
        }
    }

    /// The next group in selector order, wrapping around.
    pub fn next(self) -> Self {
        match self {
            Self::Nursery => Self::Toddler,
            Self::Toddler => Self::Preschool,
            Self::Preschool => Self::Nursery,
        }
    }

    /// The previous group in selector order, wrapping around.
    pub fn prev(self) -> Self {
        match self {
            Self::Nursery => Self::Preschool,
            Self::Toddler => Self::Nursery,
            Self::Preschool => Self::Toddler,
        }
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AgeGroup {
    type Err = AgeGroupParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        for group in Self::ALL {
            if needle == group.key() || needle == group.label().to_lowercase() {
                return Ok(group);
            }
        }
        match needle.as_str() {
            "bercario" | "berçário" => Ok(Self::Nursery),
            "maternal" => Ok(Self::Toddler),
            "pre-escola" | "pré-escola" => Ok(Self::Preschool),
            _ => Err(AgeGroupParseError(s.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`AgeGroup`] string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid age group {0:?} (expected nursery, toddler, or preschool)")]
pub struct AgeGroupParseError(pub String);

// ---------------------------------------------------------------------------
// Theme
// ---------------------------------------------------------------------------

/// A non-empty lesson theme, trimmed of surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Theme(String);

/// Error returned when a theme is empty after trimming.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("theme must not be empty")]
pub struct ThemeError;

impl Theme {
    pub fn new(value: impl AsRef<str>) -> Result<Self, ThemeError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ThemeError);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Theme {
    type Err = ThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

// ---------------------------------------------------------------------------
// Lesson idea
// ---------------------------------------------------------------------------

/// A generated activity plan.
///
/// Every instance is validated: all fields are present and non-blank, and
/// `materials` and `steps` each hold at least one entry. Deserializing goes
/// through the same checks as [`super::parse_lesson`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLesson")]
pub struct LessonIdea {
    title: String,
    objective: String,
    materials: Vec<String>,
    steps: Vec<String>,
    tips: String,
}

impl LessonIdea {
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Pedagogical goal of the activity.
    pub fn objective(&self) -> &str {
        &self.objective
    }

    pub fn materials(&self) -> &[String] {
        &self.materials
    }

    /// Procedure, in order.
    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    pub fn tips(&self) -> &str {
        &self.tips
    }
}

/// Lesson payload as decoded, before validation.
#[derive(Debug, Deserialize)]
pub(crate) struct RawLesson {
    title: String,
    objective: String,
    materials: Vec<String>,
    steps: Vec<String>,
    tips: String,
}

impl RawLesson {
    /// Name of the first field that is blank or empty, if any.
    fn first_blank_field(&self) -> Option<&'static str> {
        fn blank(s: &str) -> bool {
            s.trim().is_empty()
        }

        if blank(&self.title) {
            Some("title")
        } else if blank(&self.objective) {
            Some("objective")
        } else if self.materials.is_empty() || self.materials.iter().any(|m| blank(m)) {
            Some("materials")
        } else if self.steps.is_empty() || self.steps.iter().any(|s| blank(s)) {
            Some("steps")
        } else if blank(&self.tips) {
            Some("tips")
        } else {
            None
        }
    }
}

impl TryFrom<RawLesson> for LessonIdea {
    type Error = LessonParseError;

    fn try_from(raw: RawLesson) -> Result<Self, Self::Error> {
        if let Some(field) = raw.first_blank_field() {
            return Err(LessonParseError::BlankField(field));
        }
        Ok(Self {
            title: raw.title,
            objective: raw.objective,
            materials: raw.materials,
            steps: raw.steps,
            tips: raw.tips,
        })
    }
}
