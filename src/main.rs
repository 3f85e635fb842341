use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use acacia_edge::application::services::SessionGuard;
use acacia_edge::infrastructure::http::AcaciaApiClient;
use acacia_edge::infrastructure::observability::{TracingConfig, init_tracing};
use acacia_edge::presentation::{AppState, Environment, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;
    let settings = Settings::load(environment).context("Failed to load settings")?;

    init_tracing(&TracingConfig::from_settings(&settings.logging, environment));

    let api_client = Arc::new(
        AcaciaApiClient::from_settings(&settings.backend)
            .context("Failed to build backend HTTP client")?,
    );
    let session_guard = Arc::new(SessionGuard::new(api_client.clone()));

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("Invalid server address")?;

    tracing::info!(
        backend = %settings.backend.base_url,
        protected_paths = ?settings.session.protected_paths,
        "Edge relay configured"
    );

    let router = create_router(AppState::new(api_client, session_guard, settings));

    tracing::info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
