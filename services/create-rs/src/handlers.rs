//! HTTP handlers for the Create service (C6): validate -> replica-preferred
//! dedupe -> generate + insert (bounded retry on a unique-code collision)
//! -> respond.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration as ChronoDuration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use urlshort_core::model::{HealthStatus, NewUrlMapping};
use urlshort_core::ApiError;

use crate::models::{HealthResponse, ShortenRequest, ShortenResponse};
use crate::qr;
use crate::state::AppState;
use crate::validate;

const MAPPING_LIFETIME_DAYS: i64 = 365;
const INSERT_RETRY_BUDGET: u32 = 3;

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let db_status = match sqlx::query("SELECT 1").execute(&state.primary).await {
        Ok(_) => HealthStatus::Healthy,
        Err(_) => HealthStatus::Unhealthy,
    };
    Json(HealthResponse {
        status: db_status,
        database: db_status,
    })
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> String {
    crate::metrics::gather(&state.registry)
}

/// `POST /api/v1/create/shorten`
pub async fn shorten(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ShortenRequest>,
) -> Response {
    match create_short(&state, payload).await {
        Ok(resp) => (StatusCode::CREATED, Json(resp)).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn create_short(
    state: &AppState,
    payload: ShortenRequest,
) -> Result<ShortenResponse, ApiError> {
    let original_url = validate::validate_original_url(&payload.original_url)?;
    let base = match payload.base_url {
        Some(ref raw) => validate::normalize_base_url(raw)?,
        None => state.config.base_url.clone(),
    };

    // Step 1: dedupe via replica-preferred read (§4.6 algorithm step 1).
    state.metrics.db_reads_total.inc();
    if let Some(existing) = state.store.find_by_original(&original_url).await? {
        state
            .metrics
            .http_requests_total
            .with_label_values(&["shorten", "POST", "201"])
            .inc();
        return Ok(ShortenResponse::from_mapping(&existing, &base));
    }

    // Step 2: generate + insert, with a bounded retry on the residual
    // short_code collision race (§4.6 algorithm step 2, §7).
    for _ in 0..INSERT_RETRY_BUDGET {
        state.metrics.generator_attempts_total.inc();
        let code = state.generator.next().await?;
        let now = Utc::now();
        let new = NewUrlMapping {
            original_url: original_url.clone(),
            short_code: code,
            created_at: now,
            expires_at: now + ChronoDuration::days(MAPPING_LIFETIME_DAYS),
            shard_id: 0,
        };
        match state.store.insert(new).await {
            Ok(mapping) => {
                state.metrics.db_writes_total.inc();
                state
                    .metrics
                    .http_requests_total
                    .with_label_values(&["shorten", "POST", "201"])
                    .inc();
                return Ok(ShortenResponse::from_mapping(&mapping, &base));
            }
            Err(e) if urlshort_store::MappingStore::is_unique_violation(&e) => {
                state.metrics.unique_violation_retries_total.inc();
                tracing::warn!("short_code collision on insert, retrying");
                continue;
            }
            Err(e) => {
                tracing::error!(error = %e, "insert failed");
                return Err(ApiError::InternalServerError);
            }
        }
    }
    state.metrics.generator_exhausted_total.inc();
    Err(ApiError::UrlGenerationFailed)
}

/// `GET /api/v1/create/qr?shortUrl=...`
pub async fn generate_qr(Query(params): Query<HashMap<String, String>>) -> Response {
    let Some(short_url) = params.get("shortUrl") else {
        return ApiError::InvalidInput("missing shortUrl query parameter".to_string())
            .into_response();
    };
    match qr::render_png(short_url) {
        Ok(png) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "image/png".to_string()),
                (
                    header::CACHE_CONTROL,
                    "public, max-age=3600".to_string(),
                ),
            ],
            png,
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
