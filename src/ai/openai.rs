use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{read_json, ProviderError, ProviderResult};
use crate::config::RelayConfig;

#[derive(Debug, Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAIMessage>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: &'static str,
    content: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessageResponse,
}

#[derive(Debug, Deserialize)]
struct OpenAIMessageResponse {
    content: Option<String>,
}

/// Chat completion: fixed system preamble followed by the user's text.
pub async fn chat(config: &RelayConfig, message: &str) -> ProviderResult<String> {
    let messages = vec![
        OpenAIMessage {
            role: "system",
            content: serde_json::Value::String(config.system_prompt.clone()),
        },
        OpenAIMessage {
            role: "user",
            content: serde_json::Value::String(message.to_string()),
        },
    ];

    let request = OpenAIRequest {
        model: &config.chat_model,
        messages,
        max_tokens: config.chat_max_tokens,
        temperature: Some(config.chat_temperature),
    };

    complete(config, &request).await
}

/// Multimodal completion asking the model to describe an inline image.
pub async fn describe_image(config: &RelayConfig, image_data_url: &str) -> ProviderResult<String> {
    let messages = vec![OpenAIMessage {
        role: "user",
        content: serde_json::json!([
            {
                "type": "text",
                "text": config.vision_instruction
            },
            {
                "type": "image_url",
                "image_url": {
                    "url": image_data_url
                }
            }
        ]),
    }];

    let request = OpenAIRequest {
        model: &config.vision_model,
        messages,
        max_tokens: config.vision_max_tokens,
        temperature: None,
    };

    complete(config, &request).await
}

async fn complete(config: &RelayConfig, request: &OpenAIRequest<'_>) -> ProviderResult<String> {
    if !config.has_credential() {
        return Err(ProviderError::NotConfigured);
    }

    let client = Client::new();

    let response = client
        .post(config.endpoint("chat/completions"))
        .header("Authorization", format!("Bearer {}", config.openai_api_key))
        .header("Content-Type", "application/json")
        .json(request)
        .send()
        .await?;

    let (body, raw): (OpenAIResponse, String) = read_json(response).await?;

    body.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|content| content.trim().to_string())
        .ok_or(ProviderError::Empty { body: raw })
}
