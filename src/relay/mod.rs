pub mod handlers;
pub mod uploads;


use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::RelayConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RelayConfig>,
}

/// Build the relay's HTTP surface. Each request is handled independently;
/// the only shared state is the read-only config.
pub fn router(config: RelayConfig) -> Router {
    let body_limit = config.max_upload_bytes;
    let state = AppState {
        config: Arc::new(config),
    };

    Router::new()
        .route("/health", get(handlers::health))
        .route("/chat", post(handlers::chat))
        .route("/analizar-imagen", post(handlers::analyze_image))
        .route("/voz-a-texto", post(handlers::speech_to_text))
        .route("/generar-imagen", post(handlers::generate_image))
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
