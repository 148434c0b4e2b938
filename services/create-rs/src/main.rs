mod config;
mod generator;
mod handlers;
mod metrics;
mod models;
mod qr;
mod state;
mod validate;

use axum::{
    routing::{get, post},
    Router,
};
use prometheus::Registry;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use urlshort_store::{health::ReplicaHealthMonitor, partitions, pool, MappingStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = config::Config::from_env()?;
    tracing::info!(env = %config.app_env, "starting create-rs");

    let primary = pool::create_pool(&config.primary_database_url, &config.pool).await?;
    partitions::migrate(&primary, config.partition_lookahead_months).await?;
    tracing::info!("database ready");

    let replicas = pool::create_pools(&config.replica_database_urls, &config.pool).await?;
    let health = Arc::new(ReplicaHealthMonitor::new(
        replicas,
        primary.clone(),
        None,
    ));
    let health_handle = Arc::clone(&health).spawn().await;
    tracing::info!(replica_count = health.replica_count(), "replica health monitor running");

    let store = Arc::new(MappingStore::new(primary.clone(), Arc::clone(&health)));

    let registry = Registry::new();
    let app_metrics = metrics::init(&registry);

    let listen_addr = config.listen_addr.clone();
    let state = state::AppState::new(config, store, Arc::clone(&health), primary, app_metrics, registry);

    let app = Router::new()
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .route("/api/v1/create/shorten", post(handlers::shorten))
        .route("/api/v1/create/qr", get(handlers::generate_qr))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    health.shutdown(health_handle).await;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
