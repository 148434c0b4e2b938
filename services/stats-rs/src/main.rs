mod aggregator;
mod config;
mod handlers;
mod metrics;
mod models;
mod schema;
mod sink;
mod state;

use std::str::FromStr;
use std::sync::Arc;

use axum::{routing::get, Router};
use chrono_tz::Tz;
use prometheus::Registry;
use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use urlshort_eventbus::ClickBatcher;

use crate::aggregator::AggregatorConfig;
use crate::sink::PgEventSink;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = config::Config::from_env()?;
    tracing::info!(env = %config.app_env, "starting stats-rs");

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.stats_database_url)
        .await?;
    schema::migrate(&pool).await?;
    tracing::info!("stats database ready");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let sink = Arc::new(PgEventSink::new(pool.clone()));
    let batcher = Arc::new(ClickBatcher::new(sink, config.batcher_config()));
    let flush_ticker = Arc::clone(&batcher).spawn_flush_ticker(shutdown_rx.clone());

    let consumer_handles = urlshort_eventbus::consumer::spawn_workers(
        config.consumer_config(),
        Arc::clone(&batcher),
        shutdown_rx.clone(),
    );
    tracing::info!(
        workers = config.consumer_worker_count.max(3),
        "consumer workers started"
    );

    let tz = Tz::from_str(&config.aggregator_timezone)
        .unwrap_or_else(|_| {
            tracing::warn!(tz = %config.aggregator_timezone, "unknown timezone, defaulting to UTC");
            Tz::UTC
        });
    let aggregator_handle = aggregator::spawn(
        pool.clone(),
        AggregatorConfig {
            enabled: config.aggregator_enabled,
            interval: config.aggregator_interval,
            timezone: tz,
        },
        shutdown_rx.clone(),
    );

    let registry = Registry::new();
    let app_metrics = metrics::init(&registry);
    let listen_addr = config.listen_addr.clone();
    let state = Arc::new(state::AppState {
        pool,
        metrics: app_metrics,
        registry,
    });

    let app = Router::new()
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .route("/api/v1/stats/url/:code", get(handlers::stats_url))
        .route("/api/v1/stats/platform", get(handlers::stats_platform))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let _ = shutdown_tx.send(true);
    for handle in consumer_handles {
        let _ = handle.await;
    }
    let _ = flush_ticker.await;
    let _ = aggregator_handle.await;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
