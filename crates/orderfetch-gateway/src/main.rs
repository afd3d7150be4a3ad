//! Order fetch HTTP/JSON gateway binary.

use clap::Parser;
use orderfetch_core::storage::seed;
use orderfetch_core::StorageEngine;
use orderfetch_gateway::{create_router, AppState, Args, GatewayConfig};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = GatewayConfig::from(&args);

    info!(
        listen = %config.listen_addr,
        database = ?config.storage.path,
        "Starting order fetch gateway"
    );

    let store = StorageEngine::open(config.storage.clone())?;
    if config.seed_demo {
        store.seed(seed::demo)?;
        info!("Seeded demo orders");
    }
    info!(
        pool_size = config.storage.pool_size,
        max_results = config.fetch.max_results,
        in_clause_batch_size = config.fetch.in_clause_batch_size,
        batch_fetch_size = config.fetch.batch_fetch_size,
        request_timeout_ms = config.request_timeout.as_millis(),
        "Store ready"
    );

    let state = AppState::new(store, config.clone());
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!("Gateway listening on {}", config.listen_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
