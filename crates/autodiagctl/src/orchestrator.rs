//! Diagnostic orchestrator.
//!
//! Takes a symptom description, sends it to the daemon, interprets the
//! reply and assembles a [`DiagnosisReport`] for display. When the daemon
//! fails, the offline symptom table is consulted before giving up.
//!
//! The conversation thread is carried by a [`DiagnosisSession`] that the
//! caller owns and passes into every call.

use async_trait::async_trait;
use autodiag_shared::error::DiagnoseFailure;
use autodiag_shared::interpreter::{interpret, Strategy};
use autodiag_shared::part_images::{part_image, PartImage};
use autodiag_shared::rpc::{DiagnoseRequest, DiagnoseResponse};
use autodiag_shared::symptoms::{analyze_symptom, OfflineDiagnosis};
use autodiag_shared::{ErrorCode, LegacyCategory, VisualContext};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Transport to the diagnosis daemon
#[async_trait]
pub trait DiagnoseRpc: Send + Sync {
    async fn diagnose(&self, request: &DiagnoseRequest) -> Result<DiagnoseResponse, DiagnoseFailure>;
}

/// Conversation state kept between diagnose calls
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosisSession {
    thread_id: Option<String>,
}

impl DiagnosisSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue an existing conversation
    pub fn resume(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: Some(thread_id.into()),
        }
    }

    pub fn thread_id(&self) -> Option<&str> {
        self.thread_id.as_deref()
    }
}

/// Processing steps reported while a diagnosis runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ReceivingInput,
    RefiningPrompt,
    QueryingRag,
    GeneratingDiagnosis,
}

impl Stage {
    pub const ALL: [Stage; 4] = [
        Stage::ReceivingInput,
        Stage::RefiningPrompt,
        Stage::QueryingRag,
        Stage::GeneratingDiagnosis,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Stage::ReceivingInput => "Recebendo entrada",
            Stage::RefiningPrompt => "Refinando prompt",
            Stage::QueryingRag => "Consultando RAG",
            Stage::GeneratingDiagnosis => "Gerando diagnóstico",
        }
    }

    /// 1-based position for "n/4" displays
    pub fn position(&self) -> usize {
        Stage::ALL.iter().position(|s| s == self).unwrap_or(0) + 1
    }
}

/// Receives stage transitions, e.g. a terminal spinner
pub trait ProgressSink {
    fn stage(&self, stage: Stage);
}

/// Sink that ignores every stage
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn stage(&self, _stage: Stage) {}
}

/// Where a report came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportSource {
    Remote,
    Offline,
}

/// Summary of a daemon failure that was covered by the offline table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteFailureNote {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
    pub retryable: bool,
}

impl From<&DiagnoseFailure> for RemoteFailureNote {
    fn from(failure: &DiagnoseFailure) -> Self {
        Self {
            message: failure.message.clone(),
            code: failure.code,
            retryable: failure.retryable(),
        }
    }
}

/// Everything the CLI shows for one diagnosis
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosisReport {
    pub source: ReportSource,
    pub symptom: String,
    pub narrative: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visual_context: Option<VisualContext>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legacy_category: Option<LegacyCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_image: Option<PartImage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<Strategy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offline_entry: Option<&'static OfflineDiagnosis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_failure: Option<RemoteFailureNote>,
}

impl DiagnosisReport {
    fn from_remote(symptom: &str, response: &DiagnoseResponse) -> Self {
        let result = interpret(&response.response);
        let legacy_category = result.legacy_category();
        let part_image = result
            .visual_context
            .as_ref()
            .map(|ctx| part_image(Some(&ctx.specific_part_name)));

        Self {
            source: ReportSource::Remote,
            symptom: symptom.to_string(),
            narrative: result.narrative,
            visual_context: result.visual_context,
            legacy_category,
            part_image,
            strategy: Some(result.strategy),
            thread_id: Some(response.thread_id.clone()),
            offline_entry: None,
            remote_failure: None,
        }
    }

    fn from_offline(
        symptom: &str,
        entry: &'static OfflineDiagnosis,
        failure: Option<&DiagnoseFailure>,
    ) -> Self {
        Self {
            source: ReportSource::Offline,
            symptom: symptom.to_string(),
            narrative: entry.summary.to_string(),
            visual_context: Some(entry.to_visual_context()),
            legacy_category: Some(entry.category),
            part_image: Some(part_image(Some(entry.part_name))),
            strategy: None,
            thread_id: None,
            offline_entry: Some(entry),
            remote_failure: failure.map(RemoteFailureNote::from),
        }
    }
}

/// Why no report could be produced
#[derive(Debug, Clone, Error)]
pub enum OrchestratorError {
    #[error("Campo obrigatório: descreva o sintoma do veículo")]
    EmptySymptom,
    #[error("{0}")]
    Remote(DiagnoseFailure),
    #[error("Nenhum diagnóstico offline corresponde ao sintoma informado")]
    NoOfflineMatch,
}

/// Whether to contact the daemon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Remote,
    Offline,
}

/// Run one diagnosis.
///
/// On success the session adopts the thread id returned by the daemon.
/// A daemon failure leaves the session untouched.
pub async fn diagnose(
    rpc: &dyn DiagnoseRpc,
    session: &mut DiagnosisSession,
    symptom: &str,
    mode: Mode,
    progress: &dyn ProgressSink,
) -> Result<DiagnosisReport, OrchestratorError> {
    progress.stage(Stage::ReceivingInput);
    let symptom = symptom.trim();
    if symptom.is_empty() {
        return Err(OrchestratorError::EmptySymptom);
    }

    if mode == Mode::Offline {
        progress.stage(Stage::GeneratingDiagnosis);
        return analyze_symptom(symptom)
            .map(|entry| DiagnosisReport::from_offline(symptom, entry, None))
            .ok_or(OrchestratorError::NoOfflineMatch);
    }

    progress.stage(Stage::RefiningPrompt);
    let request = DiagnoseRequest::new(symptom, session.thread_id.clone());
    debug!("Sending {} chars, thread {:?}", symptom.len(), request.thread_id);

    progress.stage(Stage::QueryingRag);
    match rpc.diagnose(&request).await {
        Ok(response) => {
            progress.stage(Stage::GeneratingDiagnosis);
            info!("Diagnosis received on thread {}", response.thread_id);
            session.thread_id = Some(response.thread_id.clone());
            Ok(DiagnosisReport::from_remote(symptom, &response))
        }
        Err(failure) => {
            warn!("Daemon diagnosis failed: {} ({:?})", failure.message, failure.code);
            progress.stage(Stage::GeneratingDiagnosis);
            match analyze_symptom(symptom) {
                Some(entry) => Ok(DiagnosisReport::from_offline(symptom, entry, Some(&failure))),
                None => Err(OrchestratorError::Remote(failure)),
            }
        }
    }
}
