//! Stats Aggregator (C11): scheduled rollup of the raw events table into
//! `url_statistics`. Recomputes each known `short_code` from scratch per run
//! rather than tracking a cursor over event id, which keeps the rollup
//! trivially idempotent at the cost of scan efficiency at very large event
//! volumes.

use chrono::{DateTime, Datelike, TimeZone, Utc};
use chrono_tz::Tz;
use sqlx::PgPool;
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    pub enabled: bool,
    pub interval: std::time::Duration,
    pub timezone: Tz,
}

#[derive(sqlx::FromRow)]
struct CodeRollup {
    total: i64,
    today: i64,
    this_week: i64,
    this_month: i64,
    first_click_at: Option<DateTime<Utc>>,
    last_click_at: Option<DateTime<Utc>>,
}

/// Runs one aggregation pass over every distinct `short_code` seen in the raw
/// events table. Returns the number of codes upserted.
pub async fn run_once(pool: &PgPool, tz: Tz) -> anyhow::Result<u64> {
    let codes: Vec<(String,)> =
        sqlx::query_as("SELECT DISTINCT short_code FROM url_click_events")
            .fetch_all(pool)
            .await?;

    let now_local = Utc::now().with_timezone(&tz);
    let day_start = tz
        .with_ymd_and_hms(now_local.year(), now_local.month(), now_local.day(), 0, 0, 0)
        .single()
        .unwrap_or(now_local)
        .with_timezone(&Utc);
    let week_start = (day_start
        - chrono::Duration::days(now_local.weekday().num_days_from_monday() as i64))
    .with_timezone(&Utc);
    let month_start = tz
        .with_ymd_and_hms(now_local.year(), now_local.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now_local)
        .with_timezone(&Utc);

    let mut updated = 0u64;
    for (code,) in codes {
        let rollup: CodeRollup = sqlx::query_as(
            r#"
            SELECT
                count(*) AS total,
                count(*) FILTER (WHERE clicked_at >= $2) AS today,
                count(*) FILTER (WHERE clicked_at >= $3) AS this_week,
                count(*) FILTER (WHERE clicked_at >= $4) AS this_month,
                min(clicked_at) AS first_click_at,
                max(clicked_at) AS last_click_at
            FROM url_click_events
            WHERE short_code = $1
            "#,
        )
        .bind(&code)
        .bind(day_start)
        .bind(week_start)
        .bind(month_start)
        .fetch_one(pool)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO url_statistics
                (short_code, total_clicks, clicks_today, clicks_this_week, clicks_this_month,
                 first_click_at, last_click_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, now())
            ON CONFLICT (short_code) DO UPDATE SET
                total_clicks = EXCLUDED.total_clicks,
                clicks_today = EXCLUDED.clicks_today,
                clicks_this_week = EXCLUDED.clicks_this_week,
                clicks_this_month = EXCLUDED.clicks_this_month,
                first_click_at = EXCLUDED.first_click_at,
                last_click_at = EXCLUDED.last_click_at,
                updated_at = now()
            "#,
        )
        .bind(&code)
        .bind(rollup.total)
        .bind(rollup.today)
        .bind(rollup.this_week)
        .bind(rollup.this_month)
        .bind(rollup.first_click_at)
        .bind(rollup.last_click_at)
        .execute(pool)
        .await?;

        updated += 1;
    }

    Ok(updated)
}

pub fn spawn(pool: PgPool, config: AggregatorConfig, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
    tokio::spawn(async move {
        if !config.enabled {
            tracing::info!("stats aggregator disabled");
            return;
        }
        let mut ticker = tokio::time::interval(config.interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match run_once(&pool, config.timezone).await {
                        Ok(n) => tracing::info!(codes = n, "stats aggregation pass complete"),
                        Err(e) => tracing::warn!(error = %e, "stats aggregation pass failed"),
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        tracing::info!("stats aggregator shutting down");
                        break;
                    }
                }
            }
        }
    })
}
