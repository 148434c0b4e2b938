mod config;
mod handlers;
mod proxy;
mod state;

use axum::routing::{any, get};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = config::Config::from_env()?;
    tracing::info!(
        create = %config.create_base_url,
        lookup = %config.lookup_base_url,
        stats = %config.stats_base_url,
        "starting gateway-rs"
    );

    let listen_addr = config.listen_addr.clone();
    // Redirects must pass through verbatim: lookup-rs's 302 is the contract
    // for GET /{code} (spec.md §6), not something the gateway should follow
    // and re-serve on the client's behalf.
    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()?;
    let state = Arc::new(state::AppState { config, client });

    let app = Router::new()
        .route("/health", get(handlers::health))
        .route("/health/create", get(handlers::health_create))
        .route("/health/lookup", get(handlers::health_lookup))
        .route("/api/v1/create/*rest", any(proxy::create_proxy))
        .route("/api/v1/stats/*rest", any(proxy::stats_proxy))
        .route("/:code", get(proxy::lookup_proxy))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
