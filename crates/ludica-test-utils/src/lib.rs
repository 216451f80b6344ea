//! Shared test doubles for ludica integration tests.
//!
//! - [`ScriptedModel`]: a [`LessonModel`] that replays canned replies and
//!   counts calls, optionally holding each call until released.
//! - [`StaticCredentials`]: a [`CredentialSource`] with a fixed value.
//! - [`FakeGemini`]: an axum server on an ephemeral port that speaks the
//!   `generateContent` envelope and records every request it receives.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use ludica_core::credential::{Credential, CredentialSource};
use ludica_core::model::{GenerationRequest, LessonModel, ModelError};

/// A well-formed lesson as the model would return it.
pub const SAMPLE_LESSON_JSON: &str = r#"{
  "title": "Jardim das Cores",
  "objective": "Estimular a percepção sensorial através de flores e folhas da primavera.",
  "materials": ["Flores variadas", "Folhas secas", "Papel kraft", "Cola branca"],
  "steps": [
    "Leve as crianças ao pátio para recolher folhas e flores.",
    "Espalhe o papel kraft no chão e deixe que explorem as texturas.",
    "Colem juntos os elementos formando um grande jardim coletivo."
  ],
  "tips": "Verifique se nenhuma planta é tóxica antes da atividade."
}"#;

/// [`SAMPLE_LESSON_JSON`] wrapped in a markdown fence.
pub fn fenced(json: &str) -> String {
    format!("```json\n{json}\n```")
}

// ---------------------------------------------------------------------------
// Scripted model
// ---------------------------------------------------------------------------

/// One canned reply of a [`ScriptedModel`].
#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    Status(u16, String),
}

/// A [`LessonModel`] replaying canned replies in order.
///
/// When the script runs out, the last reply repeats. Clones share the
/// script, the call counter, and the gate.
#[derive(Debug, Clone)]
pub struct ScriptedModel {
    replies: Arc<Mutex<VecDeque<Reply>>>,
    last: Arc<Mutex<Option<Reply>>>,
    calls: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<GenerationRequest>>>,
    gate: Option<Arc<Semaphore>>,
}

impl ScriptedModel {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies.into_iter().collect())),
            last: Arc::new(Mutex::new(None)),
            calls: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            gate: None,
        }
    }

    /// Always answer with `text`.
    pub fn text(text: impl Into<String>) -> Self {
        Self::new([Reply::Text(text.into())])
    }

    /// Hold every call until [`Self::release`] is called once per call.
    pub fn gated(mut self) -> Self {
        self.gate = Some(Arc::new(Semaphore::new(0)));
        self
    }

    /// Let one held call proceed.
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next_reply(&self) -> Reply {
        let next = self.replies.lock().unwrap().pop_front();
        let mut last = self.last.lock().unwrap();
        if let Some(reply) = next {
            *last = Some(reply);
        }
        last.clone()
            .unwrap_or_else(|| Reply::Status(500, "script is empty".to_string()))
    }
}

#[async_trait]
impl LessonModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(
        &self,
        _credential: &Credential,
        request: &GenerationRequest,
    ) -> Result<String, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|e| ModelError::Other(e.to_string()))?
                .forget();
        }

        match self.next_reply() {
            Reply::Text(text) => Ok(text),
            Reply::Status(status, body) => Err(ModelError::Status { status, body }),
        }
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// A credential source with a fixed (possibly absent) value.
#[derive(Debug, Clone)]
pub struct StaticCredentials(Option<String>);

impl StaticCredentials {
    pub fn present(secret: &str) -> Self {
        Self(Some(secret.to_string()))
    }

    pub fn absent() -> Self {
        Self(None)
    }
}

impl CredentialSource for StaticCredentials {
    fn lookup(&self) -> Option<Credential> {
        self.0.clone().and_then(Credential::new)
    }

    fn describe(&self) -> String {
        "static test credentials".to_string()
    }
}

// ---------------------------------------------------------------------------
// Fake Gemini server
// ---------------------------------------------------------------------------

/// What the fake server answers.
#[derive(Debug, Clone)]
pub enum FakeReply {
    /// 200 with a `generateContent` envelope carrying `text`.
    Text(String),
    /// Arbitrary status and raw body.
    Raw(u16, String),
    /// Sleep, then answer with the inner reply.
    Delayed(Duration, Box<FakeReply>),
}

/// A request received by [`FakeGemini`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub api_key: Option<String>,
    pub body: Value,
}

struct FakeState {
    reply: FakeReply,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// A local stand-in for the Gemini REST API.
pub struct FakeGemini {
    addr: SocketAddr,
    state: Arc<FakeState>,
    handle: JoinHandle<()>,
}

impl FakeGemini {
    /// Start a server answering every request with `reply`.
    pub async fn start(reply: FakeReply) -> Self {
        let state = Arc::new(FakeState {
            reply,
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new().fallback(serve_generate).with_state(state.clone());
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind fake server");
        let addr = listener.local_addr().expect("failed to read local addr");

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    /// Base URL to use as the model endpoint.
    pub fn endpoint(&self) -> String {
        format!("http://{}/v1beta", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn hits(&self) -> usize {
        self.state.requests.lock().unwrap().len()
    }
}

impl Drop for FakeGemini {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Wrap `text` in a minimal successful `generateContent` response.
pub fn envelope(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }],
        "usageMetadata": {
            "promptTokenCount": 42,
            "candidatesTokenCount": 120,
            "totalTokenCount": 162
        }
    })
}

async fn serve_generate(
    State(state): State<Arc<FakeState>>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let recorded = RecordedRequest {
        path: uri.path().to_string(),
        api_key: headers
            .get("x-goog-api-key")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    };
    state.requests.lock().unwrap().push(recorded);

    respond(state.reply.clone()).await
}

async fn respond(mut reply: FakeReply) -> Response {
    loop {
        match reply {
            FakeReply::Text(text) => {
                return (StatusCode::OK, axum::Json(envelope(&text))).into_response();
            }
            FakeReply::Raw(status, body) => {
                let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                return (status, body).into_response();
            }
            FakeReply::Delayed(delay, inner) => {
                tokio::time::sleep(delay).await;
                reply = *inner;
            }
        }
    }
}
