//! Wire types for the diagnose endpoint.

use crate::error::ErrorCode;
use crate::interpreter::InterpretationResult;
use crate::zones::LegacyCategory;
use serde::{Deserialize, Serialize};

/// Request body for `POST /v1/diagnose`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnoseRequest {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
}

impl DiagnoseRequest {
    pub fn new(message: impl Into<String>, thread_id: Option<String>) -> Self {
        Self {
            message: message.into(),
            thread_id,
        }
    }
}

/// Success body for `POST /v1/diagnose`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnoseResponse {
    pub thread_id: String,
    pub response: String,
    pub message_id: String,
    pub success: bool,
}

/// Failure body returned with a non-2xx status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
}

/// Request body for `POST /v1/interpret`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterpretRequest {
    pub text: String,
}

/// Response body for `POST /v1/interpret`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterpretResponse {
    #[serde(flatten)]
    pub result: InterpretationResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_category: Option<LegacyCategory>,
}

impl From<InterpretationResult> for InterpretResponse {
    fn from(result: InterpretationResult) -> Self {
        let legacy_category = result.legacy_category();
        Self {
            result,
            legacy_category,
        }
    }
}

/// Response body for `GET /v1/health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub assistant_configured: bool,
}
