//! HTTP server for autodiagd

use crate::assistant::{AssistantApi, RealAssistantApi};
use crate::config::{Config, PollSettings, Secrets, ServerConfig};
use crate::error::ProxyError;
use crate::routes;
use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderName;
use axum::Router;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Headers browsers may send on cross-origin calls
const ALLOWED_HEADERS: [&str; 8] = [
    "authorization",
    "x-client-info",
    "apikey",
    "content-type",
    "x-supabase-client-platform",
    "x-supabase-client-platform-version",
    "x-supabase-client-runtime",
    "x-supabase-client-runtime-version",
];

/// Where diagnose requests go
pub enum Backend {
    Ready(Arc<dyn AssistantApi>),
    /// Credentials missing; diagnose answers CONFIG_ERROR naming the variable
    Unconfigured { missing: &'static str },
}

impl Backend {
    pub fn api(&self) -> Result<&Arc<dyn AssistantApi>, ProxyError> {
        match self {
            Backend::Ready(api) => Ok(api),
            Backend::Unconfigured { missing } => Err(ProxyError::config_missing(missing)),
        }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, Backend::Ready(_))
    }
}

/// Application state shared across handlers
pub struct AppState {
    pub backend: Backend,
    pub poll: PollSettings,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(backend: Backend, poll: PollSettings) -> Self {
        Self {
            backend,
            poll,
            start_time: Instant::now(),
        }
    }

    /// Build state from config and secrets. Missing secrets do not fail
    /// startup.
    pub fn from_config(config: &Config, secrets: Secrets) -> Result<Self> {
        let backend = match (secrets.missing(), secrets.api_key, secrets.assistant_id) {
            (None, Some(api_key), Some(assistant_id)) => {
                let api = RealAssistantApi::new(
                    &config.assistant.base_url,
                    api_key,
                    assistant_id,
                    config.assistant.request_timeout(),
                )
                .context("Failed to create assistant client")?;
                info!("  Assistant API at {}", config.assistant.base_url);
                Backend::Ready(Arc::new(api))
            }
            (missing, _, _) => {
                let missing = missing.unwrap_or(crate::config::API_KEY_ENV);
                warn!("{} is not set, /v1/diagnose will answer CONFIG_ERROR", missing);
                Backend::Unconfigured { missing }
            }
        };

        Ok(Self::new(backend, config.assistant.poll_settings()))
    }
}

/// Build the router with all routes and layers
pub fn app(state: AppState, max_body_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(ALLOWED_HEADERS.map(HeaderName::from_static));

    Router::new()
        .merge(routes::diagnose_routes())
        .merge(routes::interpret_routes())
        .merge(routes::health_routes())
        .with_state(Arc::new(state))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Run the HTTP server until Ctrl-C
pub async fn run(state: AppState, server: &ServerConfig) -> Result<()> {
    let app = app(state, server.max_body_bytes);

    let listener = tokio::net::TcpListener::bind(&server.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", server.bind_addr))?;
    info!("  Listening on http://{}", server.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        return;
    }
    info!("Shutting down gracefully");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_secrets_leave_backend_unconfigured() {
        let state = AppState::from_config(&Config::default(), Secrets::default()).unwrap();
        assert!(!state.backend.is_configured());
        let err = state.backend.api().err().unwrap();
        assert_eq!(err.details.as_deref(), Some("OPENAI_API_KEY não está configurada"));
    }

    #[test]
    fn test_full_secrets_build_real_backend() {
        let secrets = Secrets {
            api_key: Some("sk-test".to_string()),
            assistant_id: Some("asst_test".to_string()),
        };
        let state = AppState::from_config(&Config::default(), secrets).unwrap();
        assert!(state.backend.is_configured());
        assert_eq!(state.poll.max_attempts, 60);
    }
}
