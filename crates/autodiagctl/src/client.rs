//! HTTP client for the autodiagd daemon

use crate::orchestrator::DiagnoseRpc;
use anyhow::{Context, Result};
use async_trait::async_trait;
use autodiag_shared::error::DiagnoseFailure;
use autodiag_shared::rpc::{DiagnoseRequest, DiagnoseResponse, HealthResponse};
use autodiag_shared::{ErrorCode, DEFAULT_DAEMON_ADDR};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Environment variable overriding the daemon URL
pub const DAEMON_URL_ENV: &str = "AUTODIAG_URL";

/// Covers the daemon's own polling budget plus slack
const REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

pub struct DaemonClient {
    http: reqwest::Client,
    base_url: String,
}

impl DaemonClient {
    /// Discover the daemon URL with fallback chain
    ///
    /// Priority:
    /// 1. Explicit --daemon-url flag
    /// 2. $AUTODIAG_URL environment variable
    /// 3. http://127.0.0.1:7866 (default)
    pub fn discover_url(explicit: Option<&str>) -> String {
        if let Some(url) = explicit {
            return url.to_string();
        }

        if let Ok(url) = std::env::var(DAEMON_URL_ENV) {
            if !url.trim().is_empty() {
                return url;
            }
        }

        format!("http://{}", DEFAULT_DAEMON_ADDR)
    }

    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET /v1/health
    pub async fn health(&self) -> Result<HealthResponse> {
        let url = format!("{}/v1/health", self.base_url);
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Daemon unavailable at {}", self.base_url))?;

        if !resp.status().is_success() {
            anyhow::bail!("Health check failed: HTTP {}", resp.status());
        }

        resp.json().await.context("Invalid health response")
    }
}

#[async_trait]
impl DiagnoseRpc for DaemonClient {
    async fn diagnose(&self, request: &DiagnoseRequest) -> Result<DiagnoseResponse, DiagnoseFailure> {
        let url = format!("{}/v1/diagnose", self.base_url);
        let resp = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| DiagnoseFailure::unreachable(e.to_string()))?;

        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| DiagnoseFailure::unreachable(e.to_string()))?;
        debug!("POST {} -> {} ({} bytes)", url, status, body.len());

        if (200..300).contains(&status) {
            return serde_json::from_str(&body).map_err(|e| DiagnoseFailure {
                status,
                message: "Resposta inválida do serviço de diagnóstico".to_string(),
                details: Some(e.to_string()),
                code: None,
            });
        }

        Err(failure_from_body(status, &body))
    }
}

/// Build a failure from an error body without trusting its shape
pub fn failure_from_body(status: u16, body: &str) -> DiagnoseFailure {
    let value: Value = serde_json::from_str(body).unwrap_or(Value::Null);

    let message = value
        .get("error")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("Erro HTTP {}", status));
    let details = value
        .get("details")
        .and_then(Value::as_str)
        .map(str::to_string);
    let code = value
        .get("code")
        .cloned()
        .and_then(|c| serde_json::from_value::<ErrorCode>(c).ok());

    DiagnoseFailure {
        status,
        message,
        details,
        code,
    }
}
