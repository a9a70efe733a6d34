use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{read_json, ProviderError, ProviderResult};
use crate::config::RelayConfig;

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u8,
    size: &'a str,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<GeneratedImage>,
}

#[derive(Debug, Deserialize)]
struct GeneratedImage {
    url: Option<String>,
}

/// Ask for exactly one image at the configured size.
///
/// A success payload without a URL yields `Ok(None)`; the caller reports it as `null`.
pub async fn generate_image(config: &RelayConfig, prompt: &str) -> ProviderResult<Option<String>> {
    if !config.has_credential() {
        return Err(ProviderError::NotConfigured);
    }

    let request = ImageRequest {
        model: &config.image_model,
        prompt,
        n: 1,
        size: &config.image_size,
    };

    let client = Client::new();

    let response = client
        .post(config.endpoint("images/generations"))
        .header("Authorization", format!("Bearer {}", config.openai_api_key))
        .header("Content-Type", "application/json")
        .json(&request)
        .send()
        .await?;

    let (body, _raw): (ImageResponse, String) = read_json(response).await?;

    Ok(body.data.into_iter().next().and_then(|image| image.url))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_asks_for_a_single_image() {
        let request = ImageRequest {
            model: "dall-e-2",
            prompt: "a cat",
            n: 1,
            size: "512x512",
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["n"], 1);
        assert_eq!(json["size"], "512x512");
        assert_eq!(json["prompt"], "a cat");
    }

    #[test]
    fn response_url_may_be_missing() {
        let parsed: ImageResponse =
            serde_json::from_str(r#"{"created":1,"data":[{"b64_json":"..."}]}"#).unwrap();
        assert_eq!(parsed.data.len(), 1);
        assert!(parsed.data[0].url.is_none());
    }
}
