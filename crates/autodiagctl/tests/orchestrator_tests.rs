//! Orchestrator flow against a scripted daemon.

use async_trait::async_trait;
use autodiag_shared::error::DiagnoseFailure;
use autodiag_shared::rpc::{DiagnoseRequest, DiagnoseResponse};
use autodiag_shared::{ErrorCode, HighlightZone, LegacyCategory};
use autodiagctl::orchestrator::{
    diagnose, DiagnoseRpc, DiagnosisSession, Mode, NoProgress, OrchestratorError, ProgressSink,
    ReportSource, Stage,
};
use std::sync::Mutex;

struct FakeRpc {
    result: Result<DiagnoseResponse, DiagnoseFailure>,
    requests: Mutex<Vec<DiagnoseRequest>>,
}

impl FakeRpc {
    fn replying(thread_id: &str, text: &str) -> Self {
        Self {
            result: Ok(DiagnoseResponse {
                thread_id: thread_id.to_string(),
                response: text.to_string(),
                message_id: "msg_1".to_string(),
                success: true,
            }),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn failing(failure: DiagnoseFailure) -> Self {
        Self {
            result: Err(failure),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn requests(&self) -> Vec<DiagnoseRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl DiagnoseRpc for FakeRpc {
    async fn diagnose(&self, request: &DiagnoseRequest) -> Result<DiagnoseResponse, DiagnoseFailure> {
        self.requests.lock().unwrap().push(request.clone());
        self.result.clone()
    }
}

#[derive(Default)]
struct RecordingProgress {
    stages: Mutex<Vec<Stage>>,
}

impl ProgressSink for RecordingProgress {
    fn stage(&self, stage: Stage) {
        self.stages.lock().unwrap().push(stage);
    }
}

fn rate_limited() -> DiagnoseFailure {
    DiagnoseFailure {
        status: 503,
        message: "Limite de requisições excedido".to_string(),
        details: None,
        code: Some(ErrorCode::OpenaiRateLimit),
    }
}

#[tokio::test]
async fn test_remote_success_keeps_thread_in_session() {
    let rpc = FakeRpc::replying(
        "thread_new",
        r#"{"response": "Radiador entupido.", "visual_context": {"specific_part_name": "Radiador", "car_view_needed": "motor", "highlight_zone_id": "zone_radiator"}}"#,
    );
    let mut session = DiagnosisSession::new();

    let report = diagnose(&rpc, &mut session, "motor esquentando", Mode::Remote, &NoProgress)
        .await
        .unwrap();

    assert_eq!(report.source, ReportSource::Remote);
    assert_eq!(report.narrative, "Radiador entupido.");
    assert_eq!(
        report.visual_context.unwrap().highlight_zone_id,
        Some(HighlightZone::Radiator)
    );
    assert_eq!(report.legacy_category, Some(LegacyCategory::Motor));
    assert_eq!(session.thread_id(), Some("thread_new"));
    assert_eq!(rpc.requests()[0].thread_id, None);
}

#[tokio::test]
async fn test_session_thread_is_sent_on_next_call() {
    let rpc = FakeRpc::replying("thread_1", "Verifique o alternador.");
    let mut session = DiagnosisSession::resume("thread_1");

    diagnose(&rpc, &mut session, "bateria descarrega", Mode::Remote, &NoProgress)
        .await
        .unwrap();

    let requests = rpc.requests();
    assert_eq!(requests[0].thread_id.as_deref(), Some("thread_1"));
    assert_eq!(requests[0].message, "bateria descarrega");
}

#[tokio::test]
async fn test_plain_reply_uses_keyword_inference() {
    let rpc = FakeRpc::replying("t", "O barulho vem da pastilha de freio dianteira.");
    let mut session = DiagnosisSession::new();

    let report = diagnose(&rpc, &mut session, "barulho", Mode::Remote, &NoProgress)
        .await
        .unwrap();

    assert_eq!(report.legacy_category, Some(LegacyCategory::Freios));
    assert!(report.part_image.is_some());
}

#[tokio::test]
async fn test_remote_failure_falls_back_offline() {
    let rpc = FakeRpc::failing(rate_limited());
    let mut session = DiagnosisSession::resume("thread_old");

    let report = diagnose(&rpc, &mut session, "freio chiando", Mode::Remote, &NoProgress)
        .await
        .unwrap();

    assert_eq!(report.source, ReportSource::Offline);
    assert_eq!(report.legacy_category, Some(LegacyCategory::Freios));
    let note = report.remote_failure.unwrap();
    assert_eq!(note.code, Some(ErrorCode::OpenaiRateLimit));
    assert!(note.retryable);
    // Failed calls leave the thread alone
    assert_eq!(session.thread_id(), Some("thread_old"));
}

#[tokio::test]
async fn test_remote_failure_without_offline_match() {
    let rpc = FakeRpc::failing(DiagnoseFailure::unreachable("connection refused"));
    let mut session = DiagnosisSession::new();

    let err = diagnose(&rpc, &mut session, "rádio não sintoniza", Mode::Remote, &NoProgress)
        .await
        .unwrap_err();

    match err {
        OrchestratorError::Remote(failure) => {
            assert_eq!(failure.status, 0);
            assert!(failure.retryable());
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_blank_symptom_is_rejected_before_rpc() {
    let rpc = FakeRpc::replying("t", "x");
    let mut session = DiagnosisSession::new();

    let err = diagnose(&rpc, &mut session, "   ", Mode::Remote, &NoProgress)
        .await
        .unwrap_err();

    assert!(matches!(err, OrchestratorError::EmptySymptom));
    assert!(err.to_string().starts_with("Campo obrigatório"));
    assert!(rpc.requests().is_empty());
}

#[tokio::test]
async fn test_offline_mode_skips_rpc() {
    let rpc = FakeRpc::replying("t", "x");
    let mut session = DiagnosisSession::new();

    let report = diagnose(&rpc, &mut session, "fumaça no escapamento", Mode::Offline, &NoProgress)
        .await
        .unwrap();

    assert_eq!(report.source, ReportSource::Offline);
    assert_eq!(report.legacy_category, Some(LegacyCategory::Escapamento));
    assert!(report.remote_failure.is_none());
    assert!(rpc.requests().is_empty());

    let err = diagnose(&rpc, &mut session, "rádio não sintoniza", Mode::Offline, &NoProgress)
        .await
        .unwrap_err();
    assert!(matches!(err, OrchestratorError::NoOfflineMatch));
}

#[tokio::test]
async fn test_stages_reported_in_order() {
    let rpc = FakeRpc::replying("t", "ok");
    let mut session = DiagnosisSession::new();
    let progress = RecordingProgress::default();

    diagnose(&rpc, &mut session, "barulho", Mode::Remote, &progress)
        .await
        .unwrap();

    assert_eq!(*progress.stages.lock().unwrap(), Stage::ALL.to_vec());
}

#[tokio::test]
async fn test_report_serializes_without_empty_fields() {
    let rpc = FakeRpc::replying("t", "Sem contexto aqui.");
    let mut session = DiagnosisSession::new();

    let report = diagnose(&rpc, &mut session, "ruído estranho", Mode::Remote, &NoProgress)
        .await
        .unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["source"], "remote");
    assert_eq!(json["thread_id"], "t");
    assert!(json.get("visual_context").is_none());
    assert!(json.get("offline_entry").is_none());
}
