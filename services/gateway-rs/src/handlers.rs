use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::state::AppState;

#[derive(Debug, Serialize)]
struct ServiceHealth {
    healthy: bool,
}

async fn probe(client: &reqwest::Client, base: &str) -> bool {
    let url = format!("{}/health", base.trim_end_matches('/'));
    matches!(client.get(&url).send().await, Ok(resp) if resp.status().is_success())
}

/// `GET /health` — aggregate across Create, Lookup, Stats.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let (create_ok, lookup_ok, stats_ok) = tokio::join!(
        probe(&state.client, &state.config.create_base_url),
        probe(&state.client, &state.config.lookup_base_url),
        probe(&state.client, &state.config.stats_base_url),
    );
    Json(serde_json::json!({
        "healthy": create_ok && lookup_ok && stats_ok,
        "create": create_ok,
        "lookup": lookup_ok,
        "stats": stats_ok,
    }))
}

pub async fn health_create(State(state): State<Arc<AppState>>) -> Json<ServiceHealth> {
    Json(ServiceHealth {
        healthy: probe(&state.client, &state.config.create_base_url).await,
    })
}

pub async fn health_lookup(State(state): State<Arc<AppState>>) -> Json<ServiceHealth> {
    Json(ServiceHealth {
        healthy: probe(&state.client, &state.config.lookup_base_url).await,
    })
}
