//! RTI engine HTTP server.
//!
//! Loads the employer configuration from `RTI_CONFIG` (default
//! `./config/rti.yaml`) and serves the API on `PORT` (default 8080).

use rti_engine::api::{create_router, AppState};
use rti_engine::config::ConfigLoader;
use rti_engine::lifecycle::SubmissionManager;

const DEFAULT_CONFIG_PATH: &str = "./config/rti.yaml";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config_path =
        std::env::var("RTI_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    let config = ConfigLoader::load(&config_path).map_err(|e| {
        tracing::error!("Configuration load failed: {e}");
        e
    })?;
    tracing::info!(
        path = %config_path,
        employer_ref = %config.employer().employer_ref,
        "Configuration loaded"
    );

    let manager = SubmissionManager::in_memory(config.config());
    manager.resume_pending_confirmations().await?;

    let app = create_router(AppState::new(manager));

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("RTI engine listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
