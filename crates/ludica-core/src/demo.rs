//! Interaction state for the lesson demo.
//!
//! [`DemoSession`] owns the form inputs and the single "current result or
//! error" slot. It is UI-agnostic: the terminal front-end drives it, and so
//! do the tests.
//!
//! ```text
//!            begin()              complete(Ok)
//!   Idle ------------> Loading ---------------> Success
//!    ^  \                 |  \   complete(Err)
//!    |   \  cancel()      |   +---------------> Failed
//!    +----+---------------+
//!   Success / Failed --begin()--> Loading
//! ```

use tokio_util::sync::CancellationToken;

use crate::error::GenerateError;
use crate::generate::LessonGenerator;
use crate::lesson::{AgeGroup, LessonIdea, Theme};

/// Message shown when the credential is not configured.
pub const CONFIGURATION_MESSAGE: &str =
    "Erro de configuração: a chave de API não foi encontrada no ambiente.";
/// Message shown for every other failure.
pub const TRANSIENT_MESSAGE: &str = "Ops! Não consegui criar a ideia agora. Verifique sua conexão \
ou tente novamente em instantes.";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Which remediation a failure calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Operator must fix the environment; retrying will not help.
    Configuration,
    /// Worth trying again.
    Transient,
}

/// A user-facing failure message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureNotice {
    pub kind: FailureKind,
    pub message: String,
    /// Remediation hint, if any.
    pub hint: Option<String>,
}

impl FailureNotice {
    /// Convert a generation error into what the user sees.
    ///
    /// Returns `None` for [`GenerateError::Cancelled`], which is not a failure.
    pub fn from_error(err: &GenerateError) -> Option<Self> {
        match err {
            GenerateError::Cancelled => None,
            GenerateError::MissingCredential { expected } => Some(Self {
                kind: FailureKind::Configuration,
                message: CONFIGURATION_MESSAGE.to_string(),
                hint: Some(format!(
                    "Verifique a configuração do ambiente: defina a chave em {expected}."
                )),
            }),
            GenerateError::Service(_) | GenerateError::MalformedResponse(_) => Some(Self {
                kind: FailureKind::Transient,
                message: TRANSIENT_MESSAGE.to_string(),
                hint: None,
            }),
        }
    }
}

/// State of the demo's result area.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestState {
    #[default]
    Idle,
    Loading,
    Success(LessonIdea),
    Failed(FailureNotice),
}

impl RequestState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn lesson(&self) -> Option<&LessonIdea> {
        match self {
            Self::Success(lesson) => Some(lesson),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&FailureNotice> {
        match self {
            Self::Failed(notice) => Some(notice),
            _ => None,
        }
    }
}

/// Why a submission was not started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SubmitRejected {
    #[error("enter a theme first")]
    EmptyTheme,
    #[error("a lesson is already being generated")]
    Busy,
}

/// Everything needed to run one accepted submission.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub ticket: u64,
    pub theme: Theme,
    pub age: AgeGroup,
    pub cancel: CancellationToken,
}

#[derive(Debug)]
struct InFlight {
    ticket: u64,
    cancel: CancellationToken,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Form inputs plus the current request state.
#[derive(Debug, Default)]
pub struct DemoSession {
    /// Raw theme text as typed.
    pub theme_input: String,
    pub age: AgeGroup,
    state: RequestState,
    in_flight: Option<InFlight>,
    next_ticket: u64,
}

impl DemoSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &RequestState {
        &self.state
    }

    /// Whether a submission would currently be accepted.
    pub fn can_submit(&self) -> bool {
        self.in_flight.is_none() && Theme::new(&self.theme_input).is_ok()
    }

    /// Start a submission.
    ///
    /// Rejects an empty theme and any submission while another request is
    /// in flight. On success the previous result or error is cleared and the
    /// state becomes [`RequestState::Loading`].
    pub fn begin(&mut self) -> Result<PendingRequest, SubmitRejected> {
        if self.in_flight.is_some() {
            return Err(SubmitRejected::Busy);
        }
        let theme = Theme::new(&self.theme_input).map_err(|_| SubmitRejected::EmptyTheme)?;

        self.next_ticket += 1;
        let ticket = self.next_ticket;
        let cancel = CancellationToken::new();

        self.in_flight = Some(InFlight {
            ticket,
            cancel: cancel.clone(),
        });
        self.state = RequestState::Loading;

        Ok(PendingRequest {
            ticket,
            theme,
            age: self.age,
            cancel,
        })
    }

    /// Apply the outcome of the request identified by `ticket`.
    ///
    /// Returns `false` (and changes nothing) when `ticket` is not the request
    /// currently in flight, e.g. a result arriving after [`Self::cancel`].
    pub fn complete(&mut self, ticket: u64, result: Result<LessonIdea, GenerateError>) -> bool {
        match &self.in_flight {
            Some(current) if current.ticket == ticket => {}
            _ => {
                tracing::debug!(ticket, "ignoring stale generation result");
                return false;
            }
        }
        self.in_flight = None;

        self.state = match result {
            Ok(lesson) => RequestState::Success(lesson),
            Err(err) => match FailureNotice::from_error(&err) {
                Some(notice) => RequestState::Failed(notice),
                None => RequestState::Idle,
            },
        };
        true
    }

    /// Abort the in-flight request, if any, and return to Idle.
    pub fn cancel(&mut self) -> bool {
        match self.in_flight.take() {
            Some(current) => {
                current.cancel.cancel();
                self.state = RequestState::Idle;
                true
            }
            None => false,
        }
    }

    /// Submit and wait for the outcome in one step.
    pub async fn run(&mut self, generator: &LessonGenerator) -> Result<&RequestState, SubmitRejected> {
        let pending = self.begin()?;
        let result = generator
            .generate_with_cancel(&pending.theme, pending.age, &pending.cancel)
            .await;
        self.complete(pending.ticket, result);
        Ok(&self.state)
    }
}
