//! HTTP handlers for the Stats Query API (C12): an `axum` router over the
//! Stats DB only, serving per-URL and platform click rollups.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
use std::sync::Arc;
use urlshort_core::model::HealthStatus;
use urlshort_core::ApiError;

use crate::models::{CountryCount, DailyCount, PlatformStatisticsResponse, UrlStatisticsResponse};
use crate::state::AppState;

pub async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let db_status = match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => HealthStatus::Healthy,
        Err(_) => HealthStatus::Unhealthy,
    };
    Json(serde_json::json!({ "status": db_status, "database": db_status }))
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> String {
    crate::metrics::gather(&state.registry)
}

/// `GET /api/v1/stats/url/{code}`
pub async fn stats_url(State(state): State<Arc<AppState>>, Path(code): Path<String>) -> Response {
    let row: Option<(i64, i64, i64, i64, Option<chrono::DateTime<Utc>>, Option<chrono::DateTime<Utc>>)> =
        match sqlx::query_as(
            "SELECT total_clicks, clicks_today, clicks_this_week, clicks_this_month, \
             first_click_at, last_click_at FROM url_statistics WHERE short_code = $1",
        )
        .bind(&code)
        .fetch_optional(&state.pool)
        .await
        {
            Ok(row) => row,
            Err(e) => {
                tracing::error!(error = %e, "stats_url: rollup query failed");
                return ApiError::InternalServerError.into_response();
            }
        };

    let Some((total_clicks, clicks_today, clicks_this_week, clicks_this_month, first_click_at, last_click_at)) =
        row
    else {
        return ApiError::UrlNotFound.into_response();
    };

    let top_countries = match top_countries(&state, &code).await {
        Ok(v) => v,
        Err(e) => {
            tracing::error!(error = %e, "stats_url: top-countries query failed");
            return ApiError::InternalServerError.into_response();
        }
    };
    let daily_timeline = match daily_timeline(&state, &code).await {
        Ok(v) => v,
        Err(e) => {
            tracing::error!(error = %e, "stats_url: daily-timeline query failed");
            return ApiError::InternalServerError.into_response();
        }
    };

    state
        .metrics
        .http_requests_total
        .with_label_values(&["stats_url", "GET", "200"])
        .inc();

    Json(UrlStatisticsResponse {
        short_code: code,
        total_clicks,
        clicks_today,
        clicks_this_week,
        clicks_this_month,
        first_click_at,
        last_click_at,
        top_countries,
        daily_timeline,
    })
    .into_response()
}

async fn top_countries(state: &AppState, code: &str) -> Result<Vec<CountryCount>, sqlx::Error> {
    let rows: Vec<(Option<String>, i64)> = sqlx::query_as(
        "SELECT country, count(*) AS clicks FROM url_click_events \
         WHERE short_code = $1 GROUP BY country ORDER BY clicks DESC LIMIT 10",
    )
    .bind(code)
    .fetch_all(&state.pool)
    .await?;
    Ok(rows
        .into_iter()
        .map(|(country, clicks)| CountryCount {
            country: country.unwrap_or_else(|| "UNKNOWN".to_string()),
            clicks,
        })
        .collect())
}

async fn daily_timeline(state: &AppState, code: &str) -> Result<Vec<DailyCount>, sqlx::Error> {
    let since = Utc::now() - ChronoDuration::days(30);
    let rows: Vec<(NaiveDate, i64)> = sqlx::query_as(
        "SELECT clicked_at::date AS day, count(*) AS clicks FROM url_click_events \
         WHERE short_code = $1 AND clicked_at >= $2 GROUP BY day ORDER BY day ASC",
    )
    .bind(code)
    .bind(since)
    .fetch_all(&state.pool)
    .await?;
    Ok(rows
        .into_iter()
        .map(|(date, clicks)| DailyCount { date, clicks })
        .collect())
}

/// `GET /api/v1/stats/platform`
pub async fn stats_platform(State(state): State<Arc<AppState>>) -> Response {
    // "Active URLs" = all URLs not yet cleaned up, as seen from this side of
    // the boundary: every short_code this service has ever rolled up.
    let totals: (i64, i64) = match sqlx::query_as(
        "SELECT count(*), coalesce(sum(total_clicks), 0) FROM url_statistics",
    )
    .fetch_one(&state.pool)
    .await
    {
        Ok(t) => t,
        Err(e) => {
            tracing::error!(error = %e, "stats_platform: totals query failed");
            return ApiError::InternalServerError.into_response();
        }
    };

    let clicks_today: (i64,) = match sqlx::query_as(
        "SELECT coalesce(sum(clicks_today), 0) FROM url_statistics",
    )
    .fetch_one(&state.pool)
    .await
    {
        Ok(t) => t,
        Err(e) => {
            tracing::error!(error = %e, "stats_platform: clicks_today query failed");
            return ApiError::InternalServerError.into_response();
        }
    };

    state
        .metrics
        .http_requests_total
        .with_label_values(&["stats_platform", "GET", "200"])
        .inc();

    Json(PlatformStatisticsResponse {
        total_urls: totals.0,
        total_clicks: totals.1,
        clicks_today: clicks_today.0,
    })
    .into_response()
}
