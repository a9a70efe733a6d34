pub mod ai;
pub mod config;
pub mod error;
pub mod media;
pub mod relay;
pub mod widget;

use std::net::SocketAddr;

pub async fn run() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // ─── Configuration ───────────────────────────────────────────────
    let config = config::RelayConfig::load();
    if !config.has_credential() {
        log::warn!("OPENAI_API_KEY is not set; AI endpoints will answer with a configuration error");
    }
    tokio::fs::create_dir_all(&config.upload_dir).await?;
    log::info!("Staging uploads in {}", config.upload_dir.display());

    // ─── HTTP server ─────────────────────────────────────────────────
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = relay::router(config);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("✅ Servidor en http://localhost:{}", addr.port());
    axum::serve(listener, app).await?;
    Ok(())
}
