use std::net::SocketAddr;

use qrverify_api::{app, config, store, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("qrverify_api=info,tower_http=info")),
        )
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config().clone();
    tracing::info!("Starting QR Verify API in {:?} mode", config.environment);

    if let Err(msg) = config.validate() {
        tracing::error!("Invalid configuration: {}", msg);
        anyhow::bail!("invalid configuration: {}", msg);
    }

    let store = store::connect(&config).await?;
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let app = app(AppState::new(config, store));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("QR Verify API listening on http://{}", bind_addr);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
    Ok(())
}
