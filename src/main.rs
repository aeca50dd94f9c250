use std::sync::Arc;

use bhinekas_portal::auth::CookieSettings;
use bhinekas_portal::backend::{Backend, MemoryBackend, PgBackend};
use bhinekas_portal::config::Config;
use bhinekas_portal::{router, AppState};
use chrono::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let config = Config::load(std::env::args().skip(1))?;
    let session_lifetime = Duration::days(config.session_days);

    let backend: Arc<dyn Backend> = match &config.database_url {
        Some(url) if !config.in_memory => {
            let pg = PgBackend::connect(url, config.max_connections, session_lifetime).await?;
            pg.migrate().await?;
            Arc::new(pg)
        }
        _ => {
            log::warn!("Using the in-memory backend, nothing will be persisted");
            Arc::new(MemoryBackend::new(session_lifetime))
        }
    };

    let state = AppState::new(
        backend,
        CookieSettings {
            secure: config.secure_cookies,
        },
    );
    let app = router(state);

    log::info!("Starting Sekolah Bhinekas portal on http://{}", config.addr);
    axum::Server::bind(&config.addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    log::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::error!("Failed to install Ctrl+C handler: {}", err);
        std::future::pending::<()>().await;
    }
    log::info!("Received Ctrl+C, shutting down");
}
