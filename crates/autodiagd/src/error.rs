//! Proxy errors and their HTTP rendering.
//!
//! Every failure the daemon reports carries a user-facing message in
//! Portuguese, optional details and a stable [`ErrorCode`].

use crate::assistant::UpstreamError;
use autodiag_shared::rpc::ErrorBody;
use autodiag_shared::ErrorCode;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

/// A failed diagnose request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[{code}] {error}")]
pub struct ProxyError {
    pub code: ErrorCode,
    pub error: String,
    pub details: Option<String>,
}

/// Upstream call being made when an error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    CreateThread,
    AddMessage,
    CreateRun,
    FetchMessages,
}

impl Step {
    fn connection_error(&self) -> &'static str {
        match self {
            Step::CreateThread => "Falha ao conectar com o serviço de IA",
            Step::AddMessage => "Falha ao enviar mensagem para o serviço de IA",
            Step::CreateRun => "Falha ao iniciar análise de diagnóstico",
            Step::FetchMessages => "Falha ao recuperar resultado do diagnóstico",
        }
    }

    /// Phrase completing "Erro de conexão ..."
    fn connection_context(&self) -> &'static str {
        match self {
            Step::CreateThread => "ao criar thread",
            Step::AddMessage => "ao adicionar mensagem",
            Step::CreateRun => "ao criar run",
            Step::FetchMessages => "ao recuperar mensagens",
        }
    }

    /// Noun phrase completing "OpenAI retornou status N durante ..."
    fn status_context(&self) -> &'static str {
        match self {
            Step::CreateThread => "criação de thread",
            Step::AddMessage => "envio de mensagem",
            Step::CreateRun => "criação de run",
            Step::FetchMessages => "recuperação de mensagens",
        }
    }
}

impl ProxyError {
    pub fn new(code: ErrorCode, error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            code,
            error: error.into(),
            details: Some(details.into()),
        }
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            error: self.error.clone(),
            details: self.details.clone(),
            code: Some(self.code),
        }
    }

    pub fn config_missing(var: &str) -> Self {
        Self::new(
            ErrorCode::ConfigError,
            "Configuração do servidor incompleta",
            format!("{} não está configurada", var),
        )
    }

    pub fn invalid_json() -> Self {
        Self::new(
            ErrorCode::InvalidRequestJson,
            "Corpo da requisição inválido",
            "O corpo da requisição deve ser um JSON válido",
        )
    }

    pub fn missing_message() -> Self {
        Self::new(
            ErrorCode::MissingMessage,
            "Mensagem não fornecida",
            "O campo \"message\" é obrigatório e deve ser uma string",
        )
    }

    pub fn empty_message() -> Self {
        Self::new(
            ErrorCode::EmptyMessage,
            "Mensagem vazia",
            "A mensagem não pode estar vazia",
        )
    }

    pub fn message_too_long() -> Self {
        Self::new(
            ErrorCode::MessageTooLong,
            "Mensagem muito longa",
            "A mensagem deve ter no máximo 10.000 caracteres",
        )
    }

    pub fn timeout(waited_secs: u64) -> Self {
        Self::new(
            ErrorCode::DiagnosisTimeout,
            "Tempo limite de análise excedido",
            format!("O diagnóstico não foi concluído após {} segundos", waited_secs),
        )
    }

    pub fn run_failed() -> Self {
        Self::new(
            ErrorCode::DiagnosisFailed,
            "Análise de diagnóstico falhou",
            "O assistente de IA encontrou um erro durante a análise",
        )
    }

    pub fn run_cancelled() -> Self {
        Self::new(
            ErrorCode::DiagnosisCancelled,
            "Análise de diagnóstico cancelada",
            "A análise foi cancelada pelo sistema",
        )
    }

    pub fn run_expired() -> Self {
        Self::new(
            ErrorCode::DiagnosisExpired,
            "Sessão de análise expirada",
            "A sessão do assistente expirou",
        )
    }

    pub fn no_assistant_response() -> Self {
        Self::new(
            ErrorCode::NoAssistantResponse,
            "Nenhuma resposta do assistente encontrada",
            "O assistente não gerou uma resposta para o diagnóstico",
        )
    }

    pub fn empty_assistant_response() -> Self {
        Self::new(
            ErrorCode::EmptyAssistantResponse,
            "Resposta vazia do assistente",
            "O assistente retornou uma resposta vazia",
        )
    }

    pub fn internal(details: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, "Erro interno do servidor", details)
    }

    /// Translate a failed upstream call made during `step`
    pub fn upstream(step: Step, err: UpstreamError) -> Self {
        match err {
            UpstreamError::Connection(msg) => Self::new(
                ErrorCode::OpenaiConnectionError,
                step.connection_error(),
                format!("Erro de conexão {}: {}", step.connection_context(), msg),
            ),
            UpstreamError::Status(401) => Self::new(
                ErrorCode::OpenaiAuthError,
                "Erro de autenticação com o serviço de IA",
                "Chave da API OpenAI inválida ou expirada",
            ),
            UpstreamError::Status(429) => Self::new(
                ErrorCode::OpenaiRateLimit,
                "Serviço de IA temporariamente indisponível",
                "Limite de requisições da OpenAI excedido. Tente novamente em alguns segundos.",
            ),
            UpstreamError::Status(status @ (500 | 502 | 503)) => Self::new(
                ErrorCode::OpenaiServiceError,
                "Serviço de IA indisponível",
                format!("OpenAI retornou status {} durante {}", status, step.status_context()),
            ),
            UpstreamError::Status(status) => Self::new(
                ErrorCode::OpenaiError,
                "Erro ao comunicar com o serviço de IA",
                format!("OpenAI retornou status {} durante {}", status, step.status_context()),
            ),
            UpstreamError::InvalidBody(_) => Self::new(
                ErrorCode::OpenaiInvalidResponse,
                "Resposta inesperada do serviço de IA",
                format!("OpenAI retornou dados inválidos {}", step.connection_context()),
            ),
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        error!(
            "[Error {}] {}{}",
            status.as_u16(),
            self.error,
            self.details
                .as_deref()
                .map(|d| format!(" - {}", d))
                .unwrap_or_default()
        );
        (status, Json(self.to_body())).into_response()
    }
}
