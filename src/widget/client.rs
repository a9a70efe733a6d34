use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Chat,
    ImageAnalysis,
    Transcription,
    ImageGeneration,
}

/// One call to the relay service.
#[derive(Debug, Clone)]
pub enum RelayRequest {
    Chat { message: String },
    ImageAnalysis { image: Bytes, file_name: String },
    Transcription { audio: Bytes, file_name: String },
    ImageGeneration { prompt: String },
}

impl RelayRequest {
    pub fn kind(&self) -> RequestKind {
        match self {
            Self::Chat { .. } => RequestKind::Chat,
            Self::ImageAnalysis { .. } => RequestKind::ImageAnalysis,
            Self::Transcription { .. } => RequestKind::Transcription,
            Self::ImageGeneration { .. } => RequestKind::ImageGeneration,
        }
    }
}

impl RequestKind {
    pub fn path(self) -> &'static str {
        match self {
            Self::Chat => "/chat",
            Self::ImageAnalysis => "/analizar-imagen",
            Self::Transcription => "/voz-a-texto",
            Self::ImageGeneration => "/generar-imagen",
        }
    }

    /// Field of the relay's success body carrying the result.
    pub fn result_field(self) -> &'static str {
        match self {
            Self::Chat => "reply",
            Self::ImageAnalysis => "descripcion",
            Self::Transcription => "texto",
            Self::ImageGeneration => "url",
        }
    }
}

/// Normalized outcome of one relay call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RelayResponse {
    pub ok: bool,
    pub payload: Option<String>,
    pub error_message: Option<String>,
}

impl RelayResponse {
    pub fn success(payload: Option<String>) -> Self {
        Self {
            ok: true,
            payload,
            error_message: None,
        }
    }

    pub fn failure(error_message: Option<String>) -> Self {
        Self {
            ok: false,
            payload: None,
            error_message,
        }
    }

    /// Interpret a relay JSON body. Failures carry the body's `error` text if any.
    pub fn from_body(kind: RequestKind, success: bool, body: &Value) -> Self {
        let text = |field: &str| {
            body.get(field)
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        if success {
            Self::success(text(kind.result_field()))
        } else {
            Self::failure(text("error"))
        }
    }
}

/// How the widget reaches the relay. Implementations never fail: every outcome,
/// including transport errors, becomes a `RelayResponse`.
#[async_trait]
pub trait RelayTransport: Send + Sync {
    async fn send(&self, request: RelayRequest) -> RelayResponse;
}

/// `RelayTransport` over HTTP to a running relay service.
pub struct HttpRelay {
    client: Client,
    base_url: String,
}

impl HttpRelay {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn file_part(
        data: &Bytes,
        file_name: &str,
        mime: &str,
    ) -> reqwest::Result<reqwest::multipart::Part> {
        reqwest::multipart::Part::bytes(data.to_vec())
            .file_name(file_name.to_string())
            .mime_str(mime)
    }
}

#[async_trait]
impl RelayTransport for HttpRelay {
    async fn send(&self, request: RelayRequest) -> RelayResponse {
        let kind = request.kind();
        let url = format!("{}{}", self.base_url, kind.path());
        let builder = self.client.post(&url);

        let builder = match &request {
            RelayRequest::Chat { message } => Ok(builder.json(&json!({ "message": message }))),
            RelayRequest::ImageGeneration { prompt } => Ok(builder.json(&json!({ "prompt": prompt }))),
            RelayRequest::ImageAnalysis { image, file_name } => {
                let mime = crate::media::image_mime(image, None);
                Self::file_part(image, file_name, mime)
                    .map(|part| builder.multipart(reqwest::multipart::Form::new().part("imagen", part)))
            }
            RelayRequest::Transcription { audio, file_name } => {
                Self::file_part(audio, file_name, "audio/wav")
                    .map(|part| builder.multipart(reqwest::multipart::Form::new().part("audio", part)))
            }
        };

        let response = match builder {
            Ok(builder) => builder.send().await,
            Err(e) => Err(e),
        };
        let response = match response {
            Ok(response) => response,
            Err(e) => {
                log::warn!("Relay request to {} failed: {}", url, e);
                return RelayResponse::failure(None);
            }
        };

        let success = response.status().is_success();
        match response.json::<Value>().await {
            Ok(body) => RelayResponse::from_body(kind, success, &body),
            Err(e) => {
                log::warn!("Relay answered {} with an unreadable body: {}", url, e);
                RelayResponse::failure(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes as BodyBytes;
    use axum::http::{StatusCode, Uri};
    use axum::response::IntoResponse;
    use axum::Router;

    /// Relay stand-in with one fixed answer per path.
    async fn fake_relay(uri: Uri, body: BodyBytes) -> impl IntoResponse {
        let text = String::from_utf8_lossy(&body).into_owned();
        match uri.path() {
            "/chat" if text.contains("\"message\":\"hola\"") => {
                (StatusCode::OK, axum::Json(json!({ "reply": "¡Hola!" })))
            }
            "/chat" => (
                StatusCode::INTERNAL_SERVER_ERROR,
                axum::Json(json!({ "error": "No se pudo generar una respuesta desde OpenAI" })),
            ),
            "/voz-a-texto" if text.contains("name=\"audio\"") && text.contains("grabacion.wav") => {
                (StatusCode::OK, axum::Json(json!({ "texto": "hola mundo" })))
            }
            "/analizar-imagen" if text.contains("name=\"imagen\"") => {
                (StatusCode::OK, axum::Json(json!({ "descripcion": "un gato" })))
            }
            "/generar-imagen" => (StatusCode::OK, axum::Json(json!({ "url": null }))),
            _ => (StatusCode::BAD_REQUEST, axum::Json(json!({ "error": "bad" }))),
        }
    }

    async fn spawn_fake_relay() -> String {
        let app = Router::new().fallback(fake_relay);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/", addr)
    }

    #[test]
    fn from_body_reads_result_field_or_error() {
        let ok = RelayResponse::from_body(RequestKind::Chat, true, &json!({ "reply": "hi" }));
        assert_eq!(ok, RelayResponse::success(Some("hi".into())));

        let failed = RelayResponse::from_body(RequestKind::Chat, false, &json!({ "error": "nope" }));
        assert_eq!(failed, RelayResponse::failure(Some("nope".into())));

        let null_url = RelayResponse::from_body(RequestKind::ImageGeneration, true, &json!({ "url": null }));
        assert!(null_url.ok);
        assert!(null_url.payload.is_none());
    }

    #[tokio::test]
    async fn http_relay_speaks_each_endpoint() {
        let relay = HttpRelay::new(spawn_fake_relay().await);

        let reply = relay.send(RelayRequest::Chat { message: "hola".into() }).await;
        assert_eq!(reply.payload.as_deref(), Some("¡Hola!"));

        let error = relay.send(RelayRequest::Chat { message: "otra".into() }).await;
        assert!(!error.ok);
        assert_eq!(
            error.error_message.as_deref(),
            Some("No se pudo generar una respuesta desde OpenAI")
        );

        let texto = relay
            .send(RelayRequest::Transcription {
                audio: Bytes::from_static(b"RIFF0000WAVE"),
                file_name: "grabacion.wav".into(),
            })
            .await;
        assert_eq!(texto.payload.as_deref(), Some("hola mundo"));

        let descripcion = relay
            .send(RelayRequest::ImageAnalysis {
                image: Bytes::from_static(b"\x89PNG\r\n\x1a\n"),
                file_name: "gato.png".into(),
            })
            .await;
        assert_eq!(descripcion.payload.as_deref(), Some("un gato"));

        let url = relay
            .send(RelayRequest::ImageGeneration { prompt: "a cat".into() })
            .await;
        assert!(url.ok && url.payload.is_none());
    }

    #[tokio::test]
    async fn unreachable_relay_becomes_a_failure_without_message() {
        let relay = HttpRelay::new("http://127.0.0.1:1");
        let reply = relay.send(RelayRequest::Chat { message: "hola".into() }).await;
        assert_eq!(reply, RelayResponse::failure(None));
    }
}
