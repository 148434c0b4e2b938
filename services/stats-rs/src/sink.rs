//! Bulk insert into `url_click_events` (C10's sink). Generalizes the
//! teacher's single-row `sqlx::query(...).execute()` writes into one
//! `UNNEST`-based statement per flush, the standard sqlx idiom for batched
//! inserts.

use sqlx::PgPool;
use urlshort_core::model::ClickEvent;
use urlshort_eventbus::RawEventSink;

pub struct PgEventSink {
    pool: PgPool,
}

impl PgEventSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl RawEventSink for PgEventSink {
    async fn insert_batch(&self, events: &[ClickEvent]) -> anyhow::Result<()> {
        if events.is_empty() {
            return Ok(());
        }

        let short_codes: Vec<String> = events.iter().map(|e| e.short_code.clone()).collect();
        let ip_addresses: Vec<Option<String>> =
            events.iter().map(|e| e.ip_address.clone()).collect();
        let user_agents: Vec<Option<String>> =
            events.iter().map(|e| e.user_agent.clone()).collect();
        let referrers: Vec<Option<String>> = events.iter().map(|e| e.referrer.clone()).collect();
        let countries: Vec<Option<String>> = events.iter().map(|e| e.country.clone()).collect();
        let cities: Vec<Option<String>> = events.iter().map(|e| e.city.clone()).collect();
        let device_types: Vec<String> = events
            .iter()
            .map(|e| e.device_type.as_str().to_string())
            .collect();
        let clicked_ats: Vec<chrono::DateTime<chrono::Utc>> =
            events.iter().map(|e| e.clicked_at()).collect();

        sqlx::query(
            r#"
            INSERT INTO url_click_events
                (short_code, ip_address, user_agent, referrer, country, city, device_type, clicked_at)
            SELECT * FROM UNNEST(
                $1::text[], $2::text[], $3::text[], $4::text[],
                $5::text[], $6::text[], $7::text[], $8::timestamptz[]
            )
            "#,
        )
        .bind(&short_codes)
        .bind(&ip_addresses)
        .bind(&user_agents)
        .bind(&referrers)
        .bind(&countries)
        .bind(&cities)
        .bind(&device_types)
        .bind(&clicked_ats)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
