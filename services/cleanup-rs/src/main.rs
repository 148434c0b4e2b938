//! Cleanup Worker (C8): a standalone binary (own `Config::from_env`, a tiny
//! Prometheus registry served on its own port), driven by a daily schedule
//! rather than an HTTP-triggered run.

mod config;
mod metrics;

use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use chrono::{Duration as ChronoDuration, Utc};
use prometheus::Registry;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use urlshort_store::{health::ReplicaHealthMonitor, partitions, pool::PoolConfig, MappingStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = config::Config::from_env()?;
    tracing::info!("starting cleanup-rs");

    if !config.enabled {
        tracing::info!("cleanup worker disabled, exiting");
        return Ok(());
    }

    let primary = urlshort_store::pool::create_pool(&config.database_url, &PoolConfig::default()).await?;
    partitions::migrate(&primary, 12).await?;
    tracing::info!("database ready");

    // Writes-only worker: no replicas to route reads to.
    let health = Arc::new(ReplicaHealthMonitor::new(vec![], primary.clone(), None));
    let store = MappingStore::new(primary, health);

    let registry = Arc::new(Registry::new());
    let metrics = Arc::new(metrics::init(&registry));
    {
        let registry = Arc::clone(&registry);
        let port = config.metrics_port;
        tokio::spawn(async move {
            let app = Router::new().route(
                "/metrics",
                get(move || {
                    let registry = Arc::clone(&registry);
                    async move {
                        use prometheus::Encoder;
                        let encoder = prometheus::TextEncoder::new();
                        let mut buf = Vec::new();
                        encoder.encode(&registry.gather(), &mut buf).unwrap();
                        String::from_utf8(buf).unwrap()
                    }
                }),
            );
            let addr = format!("0.0.0.0:{port}");
            match tokio::net::TcpListener::bind(&addr).await {
                Ok(listener) => {
                    tracing::info!("metrics server on {addr}");
                    let _ = axum::serve(listener, app).await;
                }
                Err(e) => tracing::warn!(error = %e, "metrics server failed to bind"),
            }
        });
    }

    let run_interval = Duration::from_secs(config.run_interval_hours * 3600);
    let batch_pause = Duration::from_millis(config.batch_pause_ms);

    loop {
        if let Err(e) = run_pass(&store, &config, &metrics, batch_pause).await {
            metrics.pass_failures_total.inc();
            tracing::error!(error = %e, "cleanup pass aborted");
        } else {
            metrics.passes_total.inc();
        }
        tokio::time::sleep(run_interval).await;
    }
}

/// One full pass: batched deletes, each in its own short-lived write context,
/// sleeping between batches outside any open context to release connections.
/// Terminates when a batch returns fewer than `batch_size` rows.
async fn run_pass(
    store: &MappingStore,
    config: &config::Config,
    metrics: &metrics::WorkerMetrics,
    batch_pause: Duration,
) -> anyhow::Result<()> {
    let now = Utc::now();
    let access_cutoff = now - ChronoDuration::days(30 * config.retention_months);

    loop {
        let deleted = store
            .delete_batch(access_cutoff, now, config.batch_size)
            .await?;
        metrics.deleted_total.inc_by(deleted);
        tracing::info!(deleted, "cleanup batch complete");

        if (deleted as i64) < config.batch_size {
            break;
        }
        tokio::time::sleep(batch_pause).await;
    }
    Ok(())
}
