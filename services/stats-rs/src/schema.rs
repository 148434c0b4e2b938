//! Stats DB schema: `url_click_events` (raw, Consumer/Batcher-owned) and
//! `url_statistics` (rollups, Aggregator-owned). No foreign key crosses into
//! the primary/replica `url_mappings` database (§3 "Ownership").

use sqlx::PgPool;

pub async fn migrate(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS url_click_events (
            id          BIGSERIAL PRIMARY KEY,
            short_code  TEXT NOT NULL,
            ip_address  TEXT,
            user_agent  TEXT,
            referrer    TEXT,
            country     TEXT,
            city        TEXT,
            device_type TEXT NOT NULL,
            clicked_at  TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_url_click_events_short_code ON url_click_events (short_code)",
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_url_click_events_clicked_at ON url_click_events (clicked_at)",
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_url_click_events_code_clicked_at ON url_click_events (short_code, clicked_at)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS url_statistics (
            short_code        TEXT PRIMARY KEY,
            total_clicks      BIGINT NOT NULL DEFAULT 0,
            clicks_today      BIGINT NOT NULL DEFAULT 0,
            clicks_this_week  BIGINT NOT NULL DEFAULT 0,
            clicks_this_month BIGINT NOT NULL DEFAULT 0,
            first_click_at    TIMESTAMPTZ,
            last_click_at     TIMESTAMPTZ,
            updated_at        TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
