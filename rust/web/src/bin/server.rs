//! Standalone table server binary.
//!
//! Usage: cargo run -p felt-web --bin felt-server
//!
//! Game behavior is configured through the environment (`AI_MODE`,
//! `AI_TURN_DELAY_MS`, `REPLAY_ENABLED`, ...); `HOST` and `PORT` control
//! the bind address.

use felt_web::{AppConfig, AppContext, ServerConfig, WebServer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    felt_web::init_logging();

    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("PORT")
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(8000);

    let app_config = AppConfig::from_env();
    tracing::info!(
        ai_mode = %app_config.ai_mode,
        replay_enabled = app_config.replay_enabled,
        "starting table server"
    );

    let context = AppContext::new(ServerConfig::new(host, port), app_config);
    let handle = WebServer::new(context).start().await?;
    tracing::info!("server running at http://{}", handle.address());

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    handle.shutdown().await?;
    Ok(())
}
