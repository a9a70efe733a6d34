use reqwest::Client;
use serde::Deserialize;
use std::path::Path;

use super::{read_json, ProviderError, ProviderResult};
use crate::config::RelayConfig;

#[derive(Debug, Deserialize)]
struct WhisperResponse {
    text: Option<String>,
}

/// Transcribe a staged audio file with the provider's Whisper endpoint.
///
/// The file is streamed from disk into the multipart body rather than read
/// into memory first.
pub async fn transcribe_file(
    config: &RelayConfig,
    path: &Path,
    file_name: &str,
    mime: &str,
) -> ProviderResult<String> {
    if !config.has_credential() {
        return Err(ProviderError::NotConfigured);
    }

    let file = tokio::fs::File::open(path).await?;
    let length = file.metadata().await?.len();

    let part = match reqwest::multipart::Part::stream_with_length(reqwest::Body::from(file), length)
        .file_name(file_name.to_string())
        .mime_str(mime)
    {
        Ok(part) => part,
        Err(e) => {
            // mime_str consumes the part, so reopen and send it untyped.
            log::warn!("Unusable audio content type {:?}: {}", mime, e);
            let file = tokio::fs::File::open(path).await?;
            reqwest::multipart::Part::stream_with_length(reqwest::Body::from(file), length)
                .file_name(file_name.to_string())
        }
    };

    let form = reqwest::multipart::Form::new()
        .text("model", config.whisper_model.clone())
        .text("response_format", "json")
        .part("file", part);

    let client = Client::new();

    let response = client
        .post(config.endpoint("audio/transcriptions"))
        .header("Authorization", format!("Bearer {}", config.openai_api_key))
        .multipart(form)
        .send()
        .await?;

    let (result, raw): (WhisperResponse, String) = read_json(response).await?;

    result
        .text
        .map(|text| text.trim().to_string())
        .ok_or(ProviderError::Empty { body: raw })
}
