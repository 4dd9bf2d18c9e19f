//! In-process HTTP tests for the daemon routes.

use autodiag_shared::rpc::{DiagnoseResponse, ErrorBody, HealthResponse};
use autodiag_shared::ErrorCode;
use autodiagd::assistant::{FakeAssistantApi, UpstreamError};
use autodiagd::config::{Config, PollSettings};
use autodiagd::server::{app, AppState, Backend};
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

const BODY_LIMIT: usize = 65_536;

fn poll() -> PollSettings {
    PollSettings {
        interval: Duration::from_millis(1),
        max_attempts: 5,
    }
}

fn app_with(fake: FakeAssistantApi) -> Router {
    app(AppState::new(Backend::Ready(Arc::new(fake)), poll()), BODY_LIMIT)
}

fn unconfigured_app() -> Router {
    app(
        AppState::new(
            Backend::Unconfigured {
                missing: "OPENAI_ASSISTANT_ID",
            },
            poll(),
        ),
        BODY_LIMIT,
    )
}

fn post(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_diagnose_success_body_is_camel_case() {
    let app = app_with(FakeAssistantApi::completing("Verifique a bateria."));

    let (status, body) = send(app, post("/v1/diagnose", json!({"message": "não liga"}).to_string())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["threadId"], "thread_fake");
    assert_eq!(body["messageId"], "msg_fake");
    assert_eq!(body["success"], true);

    let parsed: DiagnoseResponse = serde_json::from_value(body).unwrap();
    assert_eq!(parsed.response, "Verifique a bateria.");
}

#[tokio::test]
async fn test_diagnose_invalid_json() {
    let app = app_with(FakeAssistantApi::completing("x"));

    let (status, body) = send(app, post("/v1/diagnose", "{not json")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: ErrorBody = serde_json::from_value(body).unwrap();
    assert_eq!(error.code, Some(ErrorCode::InvalidRequestJson));
    assert_eq!(error.error, "Corpo da requisição inválido");
}

#[tokio::test]
async fn test_diagnose_message_too_long() {
    let app = app_with(FakeAssistantApi::completing("x"));
    let message = "a".repeat(10_001);

    let (status, body) = send(app, post("/v1/diagnose", json!({"message": message}).to_string())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MESSAGE_TOO_LONG");
}

#[tokio::test]
async fn test_diagnose_unconfigured_names_variable() {
    let (status, body) = send(
        unconfigured_app(),
        post("/v1/diagnose", json!({"message": "oi"}).to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "CONFIG_ERROR");
    assert_eq!(body["details"], "OPENAI_ASSISTANT_ID não está configurada");
}

#[tokio::test]
async fn test_diagnose_config_checked_before_body() {
    let (status, body) = send(unconfigured_app(), post("/v1/diagnose", "garbage")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "CONFIG_ERROR");
}

#[tokio::test]
async fn test_diagnose_rate_limit_is_503() {
    let app = app_with(
        FakeAssistantApi::completing("x").with_thread_result(Err(UpstreamError::Status(429))),
    );

    let (status, body) = send(app, post("/v1/diagnose", json!({"message": "oi"}).to_string())).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "OPENAI_RATE_LIMIT");
}

#[tokio::test]
async fn test_interpret_route() {
    let app = unconfigured_app();
    let text = "O alternador no motor do seu carro parece estar com defeito.";

    let (status, body) = send(app, post("/v1/interpret", json!({"text": text}).to_string())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["narrative"], text);
    assert_eq!(body["strategy"], "keywords");
    assert_eq!(body["visual_context"]["highlight_zone_id"], "zone_alternator");
    assert_eq!(body["visual_context"]["car_view_needed"], "motor");
    assert_eq!(body["legacy_category"], "motor");
}

#[tokio::test]
async fn test_interpret_plain_text_has_no_context() {
    let (status, body) = send(
        unconfigured_app(),
        post("/v1/interpret", json!({"text": "Olá, como posso ajudar hoje?"}).to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.get("visual_context").is_none());
    assert!(body.get("legacy_category").is_none());
}

#[tokio::test]
async fn test_health_reports_configuration() {
    let request = Request::builder()
        .uri("/v1/health")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(unconfigured_app(), request).await;

    assert_eq!(status, StatusCode::OK);
    let health: HealthResponse = serde_json::from_value(body).unwrap();
    assert_eq!(health.status, "healthy");
    assert!(!health.assistant_configured);
}

#[tokio::test]
async fn test_cors_preflight_allows_any_origin() {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/v1/diagnose")
        .header(header::ORIGIN, "https://example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();

    let response = unconfigured_app().oneshot(request).await.unwrap();

    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_oversized_body_is_message_too_long() {
    let app = app(
        AppState::new(Backend::Ready(Arc::new(FakeAssistantApi::completing("x"))), poll()),
        64,
    );
    let message = "a".repeat(200);

    let (status, body) = send(app, post("/v1/diagnose", json!({"message": message}).to_string())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MESSAGE_TOO_LONG");
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_escaped_max_length_message_fits_default_limit() {
    let fake = FakeAssistantApi::completing("Verifique o carro.");
    let app = app(
        AppState::new(Backend::Ready(Arc::new(fake)), poll()),
        Config::default().server.max_body_bytes,
    );
    // 10 000 chars, each sent as an escaped surrogate pair (12 bytes)
    let body = format!(r#"{{"message": "{}"}}"#, r"\ud83d\ude97".repeat(10_000));
    assert!(body.len() > 120_000);

    let (status, value) = send(app, post("/v1/diagnose", body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["response"], "Verifique o carro.");
}

#[tokio::test]
async fn test_escaped_message_over_max_length_is_rejected_by_validation() {
    let app = app(
        AppState::new(Backend::Ready(Arc::new(FakeAssistantApi::completing("x"))), poll()),
        Config::default().server.max_body_bytes,
    );
    let body = format!(r#"{{"message": "{}"}}"#, r"\ud83d\ude97".repeat(10_001));

    let (status, value) = send(app, post("/v1/diagnose", body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(value["code"], "MESSAGE_TOO_LONG");
}
