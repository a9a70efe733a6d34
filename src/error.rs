use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::ai::ProviderError;

pub const MISSING_CREDENTIAL: &str = "API key no configurada en el servidor";
pub const PROVIDER_FAILURE: &str = "No se pudo generar una respuesta desde OpenAI";
pub const TRANSPORT_FAILURE: &str = "Error al conectar con OpenAI";
pub const STAGING_FAILURE: &str = "No se pudo procesar el archivo recibido";

pub type RelayResult<T> = Result<T, RelayError>;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("{0}")]
    Validation(String),
    #[error("provider credential is not configured")]
    Configuration,
    #[error("provider error: {}", .message.as_deref().unwrap_or("<no message>"))]
    Provider {
        message: Option<String>,
        raw: String,
    },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("upload staging failed: {0}")]
    Staging(#[from] std::io::Error),
}

impl RelayError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Caller-facing message. Transport and staging details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Configuration => MISSING_CREDENTIAL.to_string(),
            Self::Provider { message, .. } => message
                .clone()
                .unwrap_or_else(|| PROVIDER_FAILURE.to_string()),
            Self::Transport(_) => TRANSPORT_FAILURE.to_string(),
            Self::Staging(_) => STAGING_FAILURE.to_string(),
        }
    }

    /// Log with the endpoint path and hand the error back for `?`/`map_err`.
    pub fn logged(self, endpoint: &str) -> Self {
        match &self {
            Self::Validation(message) => log::warn!("Rejected {}: {}", endpoint, message),
            Self::Provider { raw, .. } => {
                log::error!("Error en la respuesta de OpenAI ({}): {}", endpoint, raw)
            }
            other => log::error!("Error en {}: {}", endpoint, other),
        }
        self
    }
}

impl From<ProviderError> for RelayError {
    fn from(error: ProviderError) -> Self {
        match error {
            ProviderError::NotConfigured => Self::Configuration,
            ProviderError::Api { message, body, .. } => Self::Provider { message, raw: body },
            ProviderError::Empty { body } => Self::Provider {
                message: None,
                raw: body,
            },
            ProviderError::Transport(e) => Self::Transport(e.to_string()),
            ProviderError::Malformed { source, body } => {
                Self::Transport(format!("{} (body: {})", source, body))
            }
            ProviderError::Io(e) => Self::Staging(e),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({
            "error": self.public_message()
        }));
        (self.status(), body).into_response()
    }
}
