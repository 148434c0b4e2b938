use urlshort_core::config::{env, env_list, env_or, env_parse, normalize_postgres_dsn};
use urlshort_store::pool::PoolConfig;

/// The Create service's slice of the platform's env-configured settings.
#[derive(Debug, Clone)]
pub struct Config {
    pub app_env: String,
    pub base_url: String,

    pub primary_database_url: String,
    pub replica_database_urls: Vec<String>,
    pub pool: PoolConfig,
    pub partition_lookahead_months: u32,

    pub generator_attempt_budget: u32,
    pub generator_range_max: u64,

    pub listen_addr: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Ok(Self {
            app_env: env_or("APP_ENV", "development"),
            base_url: env_or("BASE_URL", "http://localhost:8081"),
            primary_database_url: normalize_postgres_dsn(env("DATABASE_URL")?),
            replica_database_urls: env_list("DATABASE_REPLICA_URLS"),
            pool: PoolConfig {
                max_connections: env_parse("DB_POOL_MAX", 20),
                min_connections: env_parse("DB_POOL_MIN", 2),
                ..PoolConfig::default()
            },
            partition_lookahead_months: env_parse("PARTITION_LOOKAHEAD_MONTHS", 12),
            generator_attempt_budget: env_parse("GENERATOR_ATTEMPT_BUDGET", 100),
            generator_range_max: env_parse("GENERATOR_RANGE_MAX", 62u64.pow(6) - 1),
            listen_addr: env_or("LISTEN_ADDR", "0.0.0.0:8081"),
        })
    }
}
