use std::net::SocketAddr;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use talentflow_api::config::Config;
use talentflow_api::network::NetworkSimulator;
use talentflow_api::routes::build_router;
use talentflow_api::state::AppState;
use talentflow_api::store::{seed::seed_store, Store};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first so a bad variable fails before anything starts
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("talentflow_api={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting TalentFlow API v{}", env!("CARGO_PKG_VERSION"));

    let mut store = Store::new();
    if config.seed_data {
        seed_store(&mut store, config.seed_candidates, &mut rand::thread_rng());
    }

    let network = NetworkSimulator::from_config(&config);
    info!(
        "Network simulation: {}-{}ms latency, {:.0}% write failures",
        config.latency_min_ms,
        config.latency_max_ms,
        network.failure_rate() * 100.0
    );

    let state = AppState::new(store, network, config.clone());

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port)
        .parse()
        .context("Invalid listen address")?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
