//! Diagnose flow: validate, post to a thread, run the assistant, poll,
//! and return the latest assistant reply.

use crate::assistant::{AssistantApi, CreatedRun, RunStatus};
use crate::config::PollSettings;
use crate::error::{ProxyError, Step};
use autodiag_shared::rpc::DiagnoseResponse;
use autodiag_shared::MAX_MESSAGE_CHARS;
use serde_json::Value;
use tracing::{debug, info, warn};

/// A request that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub message: String,
    /// Thread to continue, `None` starts a new one
    pub thread_id: Option<String>,
}

/// Validate a raw request body.
///
/// An empty `message` string counts as missing, a whitespace-only one as
/// empty. A blank or non-string `threadId` is ignored.
pub fn validate_request(body: &[u8]) -> Result<ValidatedRequest, ProxyError> {
    let value: Value = serde_json::from_slice(body).map_err(|e| {
        debug!("Request body is not JSON: {}", e);
        ProxyError::invalid_json()
    })?;

    let message = match value.get("message").and_then(|m| m.as_str()) {
        Some(m) if !m.is_empty() => m,
        _ => return Err(ProxyError::missing_message()),
    };

    if message.trim().is_empty() {
        return Err(ProxyError::empty_message());
    }

    if message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(ProxyError::message_too_long());
    }

    let thread_id = match value.get("threadId") {
        Some(Value::String(id)) if !id.trim().is_empty() => Some(id.clone()),
        Some(Value::String(_)) | Some(Value::Null) | None => None,
        Some(other) => {
            warn!("Ignoring non-string threadId: {}", other);
            None
        }
    };

    Ok(ValidatedRequest {
        message: message.to_string(),
        thread_id,
    })
}

/// Run one diagnosis against the assistant service
pub async fn run_diagnosis(
    api: &dyn AssistantApi,
    request: &ValidatedRequest,
    poll: &PollSettings,
) -> Result<DiagnoseResponse, ProxyError> {
    info!(
        "Processing request: {} chars, existing thread: {}",
        request.message.chars().count(),
        request.thread_id.is_some()
    );

    let thread_id = match &request.thread_id {
        Some(id) => id.clone(),
        None => {
            info!("Creating new thread");
            let id = api
                .create_thread()
                .await
                .map_err(|e| ProxyError::upstream(Step::CreateThread, e))?;
            info!("Thread created: {}", id);
            id
        }
    };

    api.add_message(&thread_id, &request.message)
        .await
        .map_err(|e| ProxyError::upstream(Step::AddMessage, e))?;
    debug!("Message added to thread {}", thread_id);

    let run = api
        .create_run(&thread_id)
        .await
        .map_err(|e| ProxyError::upstream(Step::CreateRun, e))?;
    info!("Run created: {}", run.id);

    match wait_for_run(api, &thread_id, &run, poll).await? {
        RunStatus::Completed => {}
        RunStatus::Failed => return Err(ProxyError::run_failed()),
        RunStatus::Cancelled => return Err(ProxyError::run_cancelled()),
        RunStatus::Expired => return Err(ProxyError::run_expired()),
        other => {
            return Err(ProxyError::internal(format!(
                "Run ended in non-terminal status {:?}",
                other
            )))
        }
    }

    let messages = api
        .latest_messages(&thread_id)
        .await
        .map_err(|e| ProxyError::upstream(Step::FetchMessages, e))?;

    let reply = messages
        .iter()
        .find(|m| m.is_assistant())
        .ok_or_else(ProxyError::no_assistant_response)?;

    let text = reply.text();
    if text.trim().is_empty() {
        return Err(ProxyError::empty_assistant_response());
    }

    info!("Diagnosis complete, response length: {}", text.len());

    Ok(DiagnoseResponse {
        thread_id,
        response: text,
        message_id: reply.id.clone(),
        success: true,
    })
}

/// Poll until the run reaches a terminal status or the budget runs out.
///
/// Failed status checks are logged and retried until the budget is spent.
async fn wait_for_run(
    api: &dyn AssistantApi,
    thread_id: &str,
    run: &CreatedRun,
    poll: &PollSettings,
) -> Result<RunStatus, ProxyError> {
    let mut status = run.status.clone();
    let mut attempts = 0;

    loop {
        if let Some(current) = status.as_ref().filter(|s| s.is_terminal()) {
            return Ok(current.clone());
        }

        if attempts >= poll.max_attempts {
            warn!("Run {} still {:?} after {} checks", run.id, status, attempts);
            return Err(ProxyError::timeout(poll.budget().as_secs()));
        }

        tokio::time::sleep(poll.interval).await;
        attempts += 1;

        match api.get_run_status(thread_id, &run.id).await {
            Ok(Some(next)) => {
                debug!("Run status (attempt {}): {:?}", attempts, next);
                status = Some(next);
            }
            Ok(None) => warn!("Status check attempt {} had no status, retrying", attempts),
            Err(e) => warn!("Status check attempt {} failed: {}, retrying", attempts, e),
        }
    }
}
