//! API routes for autodiagd

use crate::diagnose::{run_diagnosis, validate_request};
use crate::error::ProxyError;
use crate::server::AppState;
use autodiag_shared::interpret;
use autodiag_shared::rpc::{DiagnoseResponse, HealthResponse, InterpretRequest, InterpretResponse};
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

type AppStateArc = Arc<AppState>;

// ============================================================================
// Diagnose Routes
// ============================================================================

pub fn diagnose_routes() -> Router<AppStateArc> {
    Router::new().route("/v1/diagnose", post(diagnose))
}

/// Body is taken raw so malformed JSON maps to INVALID_REQUEST_JSON and an
/// over-limit body to MESSAGE_TOO_LONG
async fn diagnose(
    State(state): State<AppStateArc>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<DiagnoseResponse>, ProxyError> {
    let request_id = Uuid::new_v4();
    let span = info_span!("diagnose", %request_id);

    handle_diagnose(&state, body).instrument(span).await.map(Json)
}

async fn handle_diagnose(
    state: &AppState,
    body: Result<Bytes, BytesRejection>,
) -> Result<DiagnoseResponse, ProxyError> {
    let api = state.backend.api()?;
    let body = body.map_err(|rejection| {
        warn!("Request body rejected: {}", rejection.body_text());
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ProxyError::message_too_long()
        } else {
            ProxyError::invalid_json()
        }
    })?;
    let request = validate_request(&body)?;
    run_diagnosis(api.as_ref(), &request, &state.poll).await
}

// ============================================================================
// Interpret Routes
// ============================================================================

pub fn interpret_routes() -> Router<AppStateArc> {
    Router::new().route("/v1/interpret", post(interpret_text))
}

async fn interpret_text(Json(req): Json<InterpretRequest>) -> Json<InterpretResponse> {
    let result = interpret(&req.text);
    info!("  Interpreted {} chars via {:?}", req.text.len(), result.strategy);
    Json(result.into())
}

// ============================================================================
// Health Routes
// ============================================================================

pub fn health_routes() -> Router<AppStateArc> {
    Router::new().route("/v1/health", get(health_check))
}

async fn health_check(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        assistant_configured: state.backend.is_configured(),
    })
}
