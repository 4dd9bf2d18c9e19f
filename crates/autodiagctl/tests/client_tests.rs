//! DaemonClient against an in-process mock daemon.

use autodiag_shared::rpc::DiagnoseRequest;
use autodiag_shared::ErrorCode;
use autodiagctl::client::DaemonClient;
use autodiagctl::orchestrator::DiagnoseRpc;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

async fn diagnose_handler(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    match body["message"].as_str() {
        Some("limite") => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "error": "Limite de requisições excedido",
                "details": "retry later",
                "code": "OPENAI_RATE_LIMIT"
            })),
        ),
        Some("estranho") => (
            StatusCode::BAD_GATEWAY,
            Json(json!({"error": "Algo deu errado", "code": 42})),
        ),
        Some(message) => (
            StatusCode::OK,
            Json(json!({
                "threadId": body["threadId"].as_str().unwrap_or("thread_new"),
                "response": format!("eco: {}", message),
                "messageId": "msg_1",
                "success": true
            })),
        ),
        None => (StatusCode::BAD_REQUEST, Json(json!({"error": "x"}))),
    }
}

async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "version": "1.0.0",
        "uptime_seconds": 12,
        "assistant_configured": false
    }))
}

async fn spawn_daemon() -> String {
    let app = Router::new()
        .route("/v1/diagnose", post(diagnose_handler))
        .route("/v1/health", get(health_handler));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn test_diagnose_success_and_thread_passthrough() {
    let client = DaemonClient::new(spawn_daemon().await).unwrap();

    let resp = client
        .diagnose(&DiagnoseRequest::new("barulho", Some("thread_9".to_string())))
        .await
        .unwrap();

    assert_eq!(resp.thread_id, "thread_9");
    assert_eq!(resp.response, "eco: barulho");
    assert!(resp.success);
}

#[tokio::test]
async fn test_error_body_is_parsed() {
    let client = DaemonClient::new(spawn_daemon().await).unwrap();

    let failure = client
        .diagnose(&DiagnoseRequest::new("limite", None))
        .await
        .unwrap_err();

    assert_eq!(failure.status, 503);
    assert_eq!(failure.message, "Limite de requisições excedido");
    assert_eq!(failure.code, Some(ErrorCode::OpenaiRateLimit));
    assert!(failure.retryable());
}

#[tokio::test]
async fn test_malformed_code_is_dropped() {
    let client = DaemonClient::new(spawn_daemon().await).unwrap();

    let failure = client
        .diagnose(&DiagnoseRequest::new("estranho", None))
        .await
        .unwrap_err();

    assert_eq!(failure.status, 502);
    assert_eq!(failure.message, "Algo deu errado");
    assert_eq!(failure.code, None);
    assert!(failure.retryable());
}

#[tokio::test]
async fn test_unreachable_daemon() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = DaemonClient::new(format!("http://{}", addr)).unwrap();
    let failure = client
        .diagnose(&DiagnoseRequest::new("oi", None))
        .await
        .unwrap_err();

    assert_eq!(failure.status, 0);
    assert!(failure.code.is_none());
    assert!(failure.retryable());
}

#[tokio::test]
async fn test_health() {
    let client = DaemonClient::new(spawn_daemon().await).unwrap();
    let health = client.health().await.unwrap();

    assert_eq!(health.status, "healthy");
    assert!(!health.assistant_configured);
}
