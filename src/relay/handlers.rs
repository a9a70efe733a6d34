use axum::extract::rejection::JsonRejection;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use serde_json::{json, Value};

use super::uploads::{stage_first_file, StagedUpload};
use super::AppState;
use crate::ai::{images, openai, stt};
use crate::config::RelayConfig;
use crate::error::{RelayError, RelayResult};
use crate::media;

pub const MISSING_MESSAGE: &str = "El campo 'message' es obligatorio";
pub const MISSING_PROMPT: &str = "El campo 'prompt' es obligatorio";
pub const MISSING_IMAGE: &str = "No se recibió ninguna imagen";
pub const MISSING_AUDIO: &str = "No se recibió ningún archivo de audio";

/// Log an error against its endpoint before it becomes the response.
fn failed<E: Into<RelayError>>(endpoint: &'static str) -> impl FnOnce(E) -> RelayError {
    move |error| error.into().logged(endpoint)
}

/// A non-blank string field of a JSON body. Unparseable bodies count as missing.
fn required_text(payload: Result<Json<Value>, JsonRejection>, field: &str) -> Option<String> {
    let Json(body) = payload.ok()?;
    body.get(field)?
        .as_str()
        .filter(|text| !text.trim().is_empty())
        .map(str::to_string)
}

fn ensure_credential(config: &RelayConfig) -> RelayResult<()> {
    if config.has_credential() {
        Ok(())
    } else {
        Err(RelayError::Configuration)
    }
}

async fn staged_file(
    config: &RelayConfig,
    multipart: Result<Multipart, MultipartRejection>,
) -> RelayResult<Option<StagedUpload>> {
    match multipart {
        Ok(mut multipart) => stage_first_file(&config.upload_dir, &mut multipart).await,
        Err(rejection) => {
            log::debug!("Not a multipart body: {}", rejection);
            Ok(None)
        }
    }
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "ok": true,
        "service": "backend",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> RelayResult<Json<Value>> {
    const ENDPOINT: &str = "/chat";

    let message = required_text(payload, "message")
        .ok_or_else(|| RelayError::validation(MISSING_MESSAGE))
        .map_err(failed(ENDPOINT))?;
    ensure_credential(&state.config).map_err(failed(ENDPOINT))?;

    let reply = openai::chat(&state.config, &message)
        .await
        .map_err(failed(ENDPOINT))?;

    Ok(Json(json!({ "reply": reply, "respuesta": reply })))
}

pub async fn analyze_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> RelayResult<Json<Value>> {
    const ENDPOINT: &str = "/analizar-imagen";

    let upload = staged_file(&state.config, multipart)
        .await
        .map_err(failed(ENDPOINT))?
        .ok_or_else(|| RelayError::validation(MISSING_IMAGE))
        .map_err(failed(ENDPOINT))?;

    let outcome = describe_upload(&state.config, &upload).await;
    upload.discard().await;

    let descripcion = outcome.map_err(failed(ENDPOINT))?;
    Ok(Json(json!({ "descripcion": descripcion })))
}

async fn describe_upload(config: &RelayConfig, upload: &StagedUpload) -> RelayResult<String> {
    ensure_credential(config)?;

    let bytes = tokio::fs::read(upload.path()).await?;
    let mime = media::image_mime(&bytes, upload.content_type());
    let data_url = media::data_url(mime, &bytes);

    Ok(openai::describe_image(config, &data_url).await?)
}

pub async fn speech_to_text(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> RelayResult<Json<Value>> {
    const ENDPOINT: &str = "/voz-a-texto";

    let upload = staged_file(&state.config, multipart)
        .await
        .map_err(failed(ENDPOINT))?
        .ok_or_else(|| RelayError::validation(MISSING_AUDIO))
        .map_err(failed(ENDPOINT))?;

    let outcome = transcribe_upload(&state.config, &upload).await;
    upload.discard().await;

    let texto = outcome.map_err(failed(ENDPOINT))?;
    Ok(Json(json!({ "texto": texto })))
}

async fn transcribe_upload(config: &RelayConfig, upload: &StagedUpload) -> RelayResult<String> {
    ensure_credential(config)?;

    let mime = upload
        .content_type()
        .filter(|ct| ct.starts_with("audio/") || ct.starts_with("video/"))
        .unwrap_or("application/octet-stream");

    Ok(stt::transcribe_file(config, upload.path(), upload.file_name(), mime).await?)
}

pub async fn generate_image(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> RelayResult<Json<Value>> {
    const ENDPOINT: &str = "/generar-imagen";

    let prompt = required_text(payload, "prompt")
        .ok_or_else(|| RelayError::validation(MISSING_PROMPT))
        .map_err(failed(ENDPOINT))?;
    ensure_credential(&state.config).map_err(failed(ENDPOINT))?;

    let url = images::generate_image(&state.config, &prompt)
        .await
        .map_err(failed(ENDPOINT))?;

    Ok(Json(json!({ "url": url })))
}
