use std::fmt;

use thiserror::Error;

use crate::lesson::LessonParseError;
use crate::model::ModelError;

/// Why a generation call did not produce a lesson.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// No credential was available when the call started. No request was sent.
    #[error("API credential not configured (looked in: {expected})")]
    MissingCredential { expected: String },

    #[error(transparent)]
    Service(#[from] ModelError),

    #[error(transparent)]
    MalformedResponse(#[from] LessonParseError),

    /// The caller cancelled the request before it resolved.
    #[error("generation cancelled")]
    Cancelled,
}

/// Coarse classification of a [`GenerateError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MissingCredential,
    NetworkOrService,
    MalformedResponse,
    Cancelled,
}

impl GenerateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingCredential { .. } => ErrorKind::MissingCredential,
            Self::Service(_) => ErrorKind::NetworkOrService,
            Self::MalformedResponse(_) => ErrorKind::MalformedResponse,
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Whether the failure is an operator configuration problem rather than
    /// something a retry might fix.
    pub fn is_configuration(&self) -> bool {
        self.kind() == ErrorKind::MissingCredential
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::MissingCredential => "missing_credential",
            Self::NetworkOrService => "network_or_service",
            Self::MalformedResponse => "malformed_response",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}
