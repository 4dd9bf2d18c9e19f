//! Remote assistant service client.
//!
//! The diagnose flow talks to the service through the [`AssistantApi`]
//! trait. Production code uses [`RealAssistantApi`] (reqwest against the
//! threads/runs API). Tests use [`FakeAssistantApi`] with scripted
//! responses and call counts.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Failure of a single upstream call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    /// Network failure or per-call timeout
    #[error("connection failed: {0}")]
    Connection(String),
    /// Non-2xx HTTP status
    #[error("upstream returned status {0}")]
    Status(u16),
    /// Body could not be decoded or lacks a required field
    #[error("invalid upstream body: {0}")]
    InvalidBody(String),
}

/// Lifecycle status of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Completed,
    Failed,
    Cancelled,
    Expired,
    Other(String),
}

impl RunStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "queued" => RunStatus::Queued,
            "in_progress" => RunStatus::InProgress,
            "requires_action" => RunStatus::RequiresAction,
            "cancelling" => RunStatus::Cancelling,
            "completed" => RunStatus::Completed,
            "failed" => RunStatus::Failed,
            "cancelled" => RunStatus::Cancelled,
            "expired" => RunStatus::Expired,
            other => RunStatus::Other(other.to_string()),
        }
    }

    /// Polling stops once one of these is reached
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunStatus::Completed | RunStatus::Failed | RunStatus::Cancelled | RunStatus::Expired
        )
    }
}

/// A freshly created run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedRun {
    pub id: String,
    /// Status reported at creation, absent if the body had none
    pub status: Option<RunStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct TextValue {
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ContentPart {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub text: Option<TextValue>,
}

/// One message of a thread
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ThreadMessage {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: Vec<ContentPart>,
}

impl ThreadMessage {
    pub fn assistant(id: &str, text: &str) -> Self {
        Self {
            id: id.to_string(),
            role: "assistant".to_string(),
            content: vec![ContentPart {
                kind: "text".to_string(),
                text: Some(TextValue {
                    value: text.to_string(),
                }),
            }],
        }
    }

    pub fn is_assistant(&self) -> bool {
        self.role == "assistant"
    }

    /// Text parts joined with newlines; other part types are skipped
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter(|part| part.kind == "text")
            .map(|part| part.text.as_ref().map(|t| t.value.as_str()).unwrap_or(""))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Deserialize)]
struct MessageList {
    #[serde(default)]
    data: Vec<ThreadMessage>,
}

// ============================================================================
// Assistant API Trait
// ============================================================================

/// Operations the diagnose flow needs from the assistant service
#[async_trait]
pub trait AssistantApi: Send + Sync {
    /// Create a conversation thread, returning its id
    async fn create_thread(&self) -> Result<String, UpstreamError>;

    /// Append a user message to a thread
    async fn add_message(&self, thread_id: &str, content: &str) -> Result<(), UpstreamError>;

    /// Start a run of the configured assistant on a thread
    async fn create_run(&self, thread_id: &str) -> Result<CreatedRun, UpstreamError>;

    /// Current run status. `Ok(None)` when the body carries no status.
    async fn get_run_status(
        &self,
        thread_id: &str,
        run_id: &str,
    ) -> Result<Option<RunStatus>, UpstreamError>;

    /// Most recent message of a thread, newest first
    async fn latest_messages(&self, thread_id: &str) -> Result<Vec<ThreadMessage>, UpstreamError>;
}

// ============================================================================
// Real Assistant API (Production)
// ============================================================================

/// HTTP client for the threads/runs assistant API
pub struct RealAssistantApi {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    assistant_id: String,
}

impl RealAssistantApi {
    pub fn new(
        base_url: &str,
        api_key: String,
        assistant_id: String,
        timeout: Duration,
    ) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            assistant_id,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http_client
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(&self.api_key)
            .header("OpenAI-Beta", "assistants=v2")
    }

    /// Send a request and return the body of a 2xx response
    async fn send(&self, request: RequestBuilder) -> Result<String, UpstreamError> {
        let response = request
            .send()
            .await
            .map_err(|e| UpstreamError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            debug!("Upstream returned {}", status);
            return Err(UpstreamError::Status(status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| UpstreamError::Connection(e.to_string()))
    }
}

fn parse_body(text: &str) -> Result<Value, UpstreamError> {
    serde_json::from_str(text).map_err(|e| UpstreamError::InvalidBody(e.to_string()))
}

fn required_id(body: &Value) -> Result<String, UpstreamError> {
    body.get("id")
        .and_then(|v| v.as_str())
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or_else(|| UpstreamError::InvalidBody("missing id".to_string()))
}

fn status_field(body: &Value) -> Option<RunStatus> {
    body.get("status")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(RunStatus::parse)
}

#[async_trait]
impl AssistantApi for RealAssistantApi {
    async fn create_thread(&self) -> Result<String, UpstreamError> {
        let text = self
            .send(self.request(Method::POST, "/threads").json(&json!({})))
            .await?;
        required_id(&parse_body(&text)?)
    }

    async fn add_message(&self, thread_id: &str, content: &str) -> Result<(), UpstreamError> {
        let path = format!("/threads/{}/messages", thread_id);
        self.send(
            self.request(Method::POST, &path)
                .json(&json!({ "role": "user", "content": content })),
        )
        .await?;
        Ok(())
    }

    async fn create_run(&self, thread_id: &str) -> Result<CreatedRun, UpstreamError> {
        let path = format!("/threads/{}/runs", thread_id);
        let text = self
            .send(
                self.request(Method::POST, &path)
                    .json(&json!({ "assistant_id": self.assistant_id })),
            )
            .await?;

        let body = parse_body(&text)?;
        Ok(CreatedRun {
            id: required_id(&body)?,
            status: status_field(&body),
        })
    }

    async fn get_run_status(
        &self,
        thread_id: &str,
        run_id: &str,
    ) -> Result<Option<RunStatus>, UpstreamError> {
        let path = format!("/threads/{}/runs/{}", thread_id, run_id);
        let text = self.send(self.request(Method::GET, &path)).await?;
        Ok(status_field(&parse_body(&text)?))
    }

    async fn latest_messages(&self, thread_id: &str) -> Result<Vec<ThreadMessage>, UpstreamError> {
        let path = format!("/threads/{}/messages?order=desc&limit=1", thread_id);
        let text = self.send(self.request(Method::GET, &path)).await?;
        let list: MessageList =
            serde_json::from_str(&text).map_err(|e| UpstreamError::InvalidBody(e.to_string()))?;
        Ok(list.data)
    }
}

// ============================================================================
// Fake Assistant API (Testing)
// ============================================================================

/// Scripted assistant service for deterministic tests.
///
/// ```rust,ignore
/// let fake = FakeAssistantApi::completing("Verifique o radiador.")
///     .with_polls(vec![Ok(Some(RunStatus::InProgress)), Ok(Some(RunStatus::Completed))]);
/// ```
pub struct FakeAssistantApi {
    thread: Result<String, UpstreamError>,
    add_message: Result<(), UpstreamError>,
    run: Result<CreatedRun, UpstreamError>,
    /// Consumed one per status check; `InProgress` once exhausted
    polls: Mutex<VecDeque<Result<Option<RunStatus>, UpstreamError>>>,
    messages: Result<Vec<ThreadMessage>, UpstreamError>,
    call_counts: Arc<Mutex<HashMap<&'static str, usize>>>,
    posted: Mutex<Vec<(String, String)>>,
}

impl FakeAssistantApi {
    /// A service that finishes the run on the first status check and
    /// replies with `reply`
    pub fn completing(reply: &str) -> Self {
        Self {
            thread: Ok("thread_fake".to_string()),
            add_message: Ok(()),
            run: Ok(CreatedRun {
                id: "run_fake".to_string(),
                status: Some(RunStatus::Queued),
            }),
            polls: Mutex::new(VecDeque::from(vec![Ok(Some(RunStatus::Completed))])),
            messages: Ok(vec![ThreadMessage::assistant("msg_fake", reply)]),
            call_counts: Arc::new(Mutex::new(HashMap::new())),
            posted: Mutex::new(Vec::new()),
        }
    }

    pub fn with_thread_result(mut self, result: Result<String, UpstreamError>) -> Self {
        self.thread = result;
        self
    }

    pub fn with_add_message_result(mut self, result: Result<(), UpstreamError>) -> Self {
        self.add_message = result;
        self
    }

    pub fn with_run_result(mut self, result: Result<CreatedRun, UpstreamError>) -> Self {
        self.run = result;
        self
    }

    pub fn with_polls(self, polls: Vec<Result<Option<RunStatus>, UpstreamError>>) -> Self {
        *self.polls.lock().unwrap() = polls.into();
        self
    }

    pub fn with_messages_result(mut self, result: Result<Vec<ThreadMessage>, UpstreamError>) -> Self {
        self.messages = result;
        self
    }

    /// Number of calls to an operation, by trait method name
    pub fn call_count(&self, op: &str) -> usize {
        self.call_counts.lock().unwrap().get(op).copied().unwrap_or(0)
    }

    /// `(thread_id, content)` of every posted message
    pub fn posted_messages(&self) -> Vec<(String, String)> {
        self.posted.lock().unwrap().clone()
    }

    fn record(&self, op: &'static str) {
        *self.call_counts.lock().unwrap().entry(op).or_insert(0) += 1;
    }
}

#[async_trait]
impl AssistantApi for FakeAssistantApi {
    async fn create_thread(&self) -> Result<String, UpstreamError> {
        self.record("create_thread");
        self.thread.clone()
    }

    async fn add_message(&self, thread_id: &str, content: &str) -> Result<(), UpstreamError> {
        self.record("add_message");
        self.posted
            .lock()
            .unwrap()
            .push((thread_id.to_string(), content.to_string()));
        self.add_message.clone()
    }

    async fn create_run(&self, _thread_id: &str) -> Result<CreatedRun, UpstreamError> {
        self.record("create_run");
        self.run.clone()
    }

    async fn get_run_status(
        &self,
        _thread_id: &str,
        _run_id: &str,
    ) -> Result<Option<RunStatus>, UpstreamError> {
        self.record("get_run_status");
        self.polls
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(Some(RunStatus::InProgress)))
    }

    async fn latest_messages(&self, _thread_id: &str) -> Result<Vec<ThreadMessage>, UpstreamError> {
        self.record("latest_messages");
        self.messages.clone()
    }
}
