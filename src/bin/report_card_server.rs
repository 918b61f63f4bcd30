// Report Card Server Binary Entry Point
//
// Usage: cargo run --bin report_card_server

use report_card_server::{create_router, AppState, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (structured logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    // Default log level: info for our crate, warn for others
                    "report_card_server=info,tower_http=debug,axum=debug,warn".into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting report card server...");

    let config = ServerConfig::from_env();
    tracing::info!("Configuration:");
    tracing::info!("  REPORT_CARD_STORE: {:?}", config.store);
    tracing::info!("  REPORT_CARD_FILE: {}", config.storage_file.display());
    tracing::info!("  PORT: {}", config.port);

    let state = AppState::from_config(&config);
    let app = create_router(state);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .await?;

    Ok(())
}
