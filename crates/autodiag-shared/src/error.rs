//! Error codes shared by the daemon and the CLI.
//!
//! Each code carries the HTTP status the daemon answers with. The CLI uses
//! `retryable()` to decide whether to suggest trying again.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ConfigError,
    InvalidRequestJson,
    MissingMessage,
    EmptyMessage,
    MessageTooLong,
    OpenaiConnectionError,
    OpenaiAuthError,
    OpenaiRateLimit,
    OpenaiServiceError,
    OpenaiError,
    OpenaiInvalidResponse,
    DiagnosisTimeout,
    DiagnosisFailed,
    DiagnosisCancelled,
    DiagnosisExpired,
    NoAssistantResponse,
    EmptyAssistantResponse,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ConfigError => "CONFIG_ERROR",
            ErrorCode::InvalidRequestJson => "INVALID_REQUEST_JSON",
            ErrorCode::MissingMessage => "MISSING_MESSAGE",
            ErrorCode::EmptyMessage => "EMPTY_MESSAGE",
            ErrorCode::MessageTooLong => "MESSAGE_TOO_LONG",
            ErrorCode::OpenaiConnectionError => "OPENAI_CONNECTION_ERROR",
            ErrorCode::OpenaiAuthError => "OPENAI_AUTH_ERROR",
            ErrorCode::OpenaiRateLimit => "OPENAI_RATE_LIMIT",
            ErrorCode::OpenaiServiceError => "OPENAI_SERVICE_ERROR",
            ErrorCode::OpenaiError => "OPENAI_ERROR",
            ErrorCode::OpenaiInvalidResponse => "OPENAI_INVALID_RESPONSE",
            ErrorCode::DiagnosisTimeout => "DIAGNOSIS_TIMEOUT",
            ErrorCode::DiagnosisFailed => "DIAGNOSIS_FAILED",
            ErrorCode::DiagnosisCancelled => "DIAGNOSIS_CANCELLED",
            ErrorCode::DiagnosisExpired => "DIAGNOSIS_EXPIRED",
            ErrorCode::NoAssistantResponse => "NO_ASSISTANT_RESPONSE",
            ErrorCode::EmptyAssistantResponse => "EMPTY_ASSISTANT_RESPONSE",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }

    /// HTTP status conveying the error category
    pub fn http_status(&self) -> u16 {
        match self {
            ErrorCode::InvalidRequestJson
            | ErrorCode::MissingMessage
            | ErrorCode::EmptyMessage
            | ErrorCode::MessageTooLong => 400,
            ErrorCode::ConfigError
            | ErrorCode::DiagnosisFailed
            | ErrorCode::DiagnosisCancelled
            | ErrorCode::DiagnosisExpired
            | ErrorCode::NoAssistantResponse
            | ErrorCode::EmptyAssistantResponse
            | ErrorCode::InternalError => 500,
            ErrorCode::OpenaiConnectionError
            | ErrorCode::OpenaiAuthError
            | ErrorCode::OpenaiServiceError
            | ErrorCode::OpenaiError
            | ErrorCode::OpenaiInvalidResponse => 502,
            ErrorCode::OpenaiRateLimit => 503,
            ErrorCode::DiagnosisTimeout => 504,
        }
    }

    /// Whether the same request may succeed if sent again later
    pub fn retryable(&self) -> bool {
        matches!(
            self,
            ErrorCode::OpenaiConnectionError
                | ErrorCode::OpenaiRateLimit
                | ErrorCode::OpenaiServiceError
                | ErrorCode::DiagnosisTimeout
                | ErrorCode::DiagnosisFailed
                | ErrorCode::DiagnosisCancelled
                | ErrorCode::DiagnosisExpired
                | ErrorCode::EmptyAssistantResponse
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A diagnosis failure as seen by a client of the daemon
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DiagnoseFailure {
    /// HTTP status, 0 when the daemon could not be reached
    pub status: u16,
    pub message: String,
    pub details: Option<String>,
    pub code: Option<ErrorCode>,
}

impl DiagnoseFailure {
    /// The daemon did not answer at all
    pub fn unreachable(details: impl Into<String>) -> Self {
        Self {
            status: 0,
            message: "Não foi possível conectar ao serviço de diagnóstico".to_string(),
            details: Some(details.into()),
            code: None,
        }
    }

    pub fn retryable(&self) -> bool {
        match self.code {
            Some(code) => code.retryable(),
            None => self.status == 0 || self.status >= 500,
        }
    }
}
