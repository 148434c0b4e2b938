use urlshort_core::config::{env, env_or, env_parse, normalize_postgres_dsn};

/// A standalone worker's config; no HTTP surface beyond `/metrics`.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub enabled: bool,
    pub retention_months: i64,
    pub batch_size: i64,
    pub batch_pause_ms: u64,
    pub run_interval_hours: u64,
    pub metrics_port: u16,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Ok(Self {
            database_url: normalize_postgres_dsn(env("DATABASE_URL")?),
            enabled: env_parse("CLEANUP_ENABLED", true),
            retention_months: env_parse("CLEANUP_RETENTION_MONTHS", 6),
            batch_size: env_parse("CLEANUP_BATCH_SIZE", 1000),
            batch_pause_ms: env_parse("CLEANUP_BATCH_PAUSE_MS", 100),
            run_interval_hours: env_parse("CLEANUP_RUN_INTERVAL_HOURS", 24),
            metrics_port: env_parse("CLEANUP_METRICS_PORT", 9300),
        })
    }
}
