//! HTTP handlers for the Lookup service (C7): the full S0-S7 state machine
//! (cache-get -> db-lookup -> expiry check -> cache-put -> fire-and-forget
//! access-touch + click-event emit) behind a single `GET /{code}` redirect.

use axum::{
    extract::{ConnectInfo, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use chrono::Utc;
use std::net::SocketAddr;
use std::sync::Arc;
use urlshort_core::model::{ClickEvent, DeviceType, HealthStatus};
use urlshort_core::ApiError;

use crate::models::HealthResponse;
use crate::state::AppState;

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let db_status = match sqlx::query("SELECT 1").execute(state.store.primary_pool()).await {
        Ok(_) => HealthStatus::Healthy,
        Err(_) => HealthStatus::Unhealthy,
    };
    let cache_status = match state.cache.ping().await {
        Ok(_) => HealthStatus::Healthy,
        Err(_) => HealthStatus::Unhealthy,
    };
    let overall = if db_status == HealthStatus::Healthy && cache_status == HealthStatus::Healthy {
        HealthStatus::Healthy
    } else {
        HealthStatus::Unhealthy
    };
    Json(HealthResponse {
        status: overall,
        database: db_status,
        cache: cache_status,
    })
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> String {
    crate::metrics::gather(&state.registry)
}

/// `GET /{code}`
pub async fn redirect(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Response {
    // S0 input-check.
    if code.trim().is_empty() {
        return ApiError::InvalidInput("short code must not be empty".to_string()).into_response();
    }

    let key = state.cache.url_key(&code);

    // S1 cache-get.
    if let Some(original_url) = state.cache.get(&key).await {
        state.metrics.cache_hits_total.inc();
        state.metrics.redis_ops_total.inc();
        state
            .metrics
            .http_requests_total
            .with_label_values(&["redirect", "GET", "302"])
            .inc();
        spawn_observational(Arc::clone(&state), code.clone(), headers, peer);
        return Redirect::found(&original_url).into_response();
    }
    state.metrics.cache_misses_total.inc();

    // S2 db-lookup (read-only, replica-preferred).
    state.metrics.db_reads_total.inc();
    let mapping = match state.store.find_by_short(&code).await {
        Ok(Some(m)) => m,
        Ok(None) => return ApiError::UrlNotFound.into_response(),
        Err(e) => {
            tracing::error!(error = %e, "lookup: db-lookup failed");
            return ApiError::InternalServerError.into_response();
        }
    };

    // S3 freshness check.
    if mapping.expires_at < Utc::now() {
        return ApiError::UrlExpired.into_response();
    }

    // S4 cache-put.
    if let Err(e) = state
        .cache
        .put(&key, &mapping.original_url, Some(state.config.cache.cold_ttl))
        .await
    {
        tracing::warn!(error = %e, "lookup: cache-put failed, degrading gracefully");
    }
    state.metrics.redis_ops_total.inc();
    state
        .metrics
        .http_requests_total
        .with_label_values(&["redirect", "GET", "302"])
        .inc();

    spawn_observational(Arc::clone(&state), code.clone(), headers, peer);

    Redirect::found(&mapping.original_url).into_response()
}

/// S5 access-touch + S6 event-emit, run in a detached task in their own write
/// context. Errors here MUST NOT fail the redirect already returned above.
fn spawn_observational(
    state: Arc<AppState>,
    code: String,
    headers: HeaderMap,
    peer: SocketAddr,
) {
    let ip_address = client_ip(&headers, peer);
    let user_agent = headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let referrer = headers
        .get(axum::http::header::REFERER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    tokio::spawn(async move {
        // S5 access-touch: a fresh write context, independent of the
        // read-only lookup above.
        match state.store.find_by_short(&code).await {
            Ok(Some(mapping)) => {
                let new_count = mapping.access_count + 1;
                if let Err(e) = state
                    .store
                    .touch_access(mapping.id, new_count, Utc::now())
                    .await
                {
                    state.metrics.touch_errors_total.inc();
                    tracing::warn!(error = %e, code = %code, "lookup: access-touch failed");
                }
            }
            Ok(None) => {}
            Err(e) => {
                state.metrics.touch_errors_total.inc();
                tracing::warn!(error = %e, code = %code, "lookup: access-touch lookup failed");
            }
        }

        // S6 event-emit: non-blocking publish, errors logged and swallowed.
        let (country, city) = state.geo.resolve(ip_address.as_deref());
        let device_type = user_agent
            .as_deref()
            .map(DeviceType::from_user_agent)
            .unwrap_or(DeviceType::Unknown);
        let event = ClickEvent {
            short_code: code,
            ip_address,
            user_agent,
            referrer,
            country,
            city,
            device_type,
            timestamp: Utc::now().timestamp_millis(),
        };
        let published = urlshort_eventbus::producer::publish_click(
            &state.producer,
            &state.config.kafka_click_topic,
            &event,
        )
        .await;
        if published {
            state.metrics.kafka_publish_total.inc();
        }
    });
}

fn client_ip(headers: &HeaderMap, peer: SocketAddr) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .or_else(|| Some(peer.ip().to_string()))
}
