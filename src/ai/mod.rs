pub mod images;
pub mod openai;
pub mod stt;

use serde::de::DeserializeOwned;
use thiserror::Error;

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Failures talking to the generative-AI provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("OpenAI API key not configured")]
    NotConfigured,
    #[error("provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("provider returned an error ({status}): {body}")]
    Api {
        status: u16,
        message: Option<String>,
        body: String,
    },
    #[error("provider returned no result: {body}")]
    Empty { body: String },
    #[error("could not decode provider response: {source}")]
    Malformed {
        #[source]
        source: serde_json::Error,
        body: String,
    },
    #[error("could not read staged upload: {0}")]
    Io(#[from] std::io::Error),
}

/// Extract `error.message` (or a bare string `error`) from a provider body.
pub(crate) fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("error")? {
        serde_json::Value::String(message) => Some(message.clone()),
        serde_json::Value::Object(object) => object
            .get("message")
            .and_then(|m| m.as_str())
            .filter(|m| !m.trim().is_empty())
            .map(str::to_string),
        _ => None,
    }
}

/// Read a provider response body, turning error payloads into `ProviderError::Api`.
///
/// Providers sometimes answer `200` with an `error` object, so the body is
/// inspected regardless of status.
pub(crate) async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> ProviderResult<(T, String)> {
    let status = response.status();
    let body = response.text().await?;

    let message = error_message(&body);
    if message.is_some() || !status.is_success() {
        return Err(ProviderError::Api {
            status: status.as_u16(),
            message,
            body,
        });
    }

    match serde_json::from_str(&body) {
        Ok(parsed) => Ok((parsed, body)),
        Err(source) => Err(ProviderError::Malformed { source, body }),
    }
}
