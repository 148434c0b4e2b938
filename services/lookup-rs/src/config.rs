use urlshort_core::config::{env, env_list, env_or, env_parse, normalize_postgres_dsn};
use urlshort_cache::CacheConfig;
use urlshort_store::pool::PoolConfig;

/// The Lookup service's slice of the platform's env-configured settings.
#[derive(Debug, Clone)]
pub struct Config {
    pub app_env: String,

    pub primary_database_url: String,
    pub replica_database_urls: Vec<String>,
    pub pool: PoolConfig,

    pub redis_url: String,
    pub cache: CacheConfig,

    pub kafka_bootstrap_servers: String,
    pub kafka_click_topic: String,

    pub listen_addr: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Ok(Self {
            app_env: env_or("APP_ENV", "development"),
            primary_database_url: normalize_postgres_dsn(env("DATABASE_URL")?),
            replica_database_urls: env_list("DATABASE_REPLICA_URLS"),
            pool: PoolConfig {
                max_connections: env_parse("DB_POOL_MAX", 20),
                min_connections: env_parse("DB_POOL_MIN", 2),
                ..PoolConfig::default()
            },
            redis_url: env("REDIS_URL")?,
            cache: CacheConfig {
                key_prefix: env_or("CACHE_KEY_PREFIX", "url"),
                access_counter_prefix: env_or("CACHE_ACCESS_COUNTER_PREFIX", "access"),
                cold_ttl: std::time::Duration::from_secs(env_parse("CACHE_COLD_TTL_SECONDS", 600)),
                warm_ttl: std::time::Duration::from_secs(env_parse("CACHE_WARM_TTL_SECONDS", 900)),
                hot_ttl: std::time::Duration::from_secs(env_parse("CACHE_HOT_TTL_SECONDS", 1800)),
                warm_threshold: env_parse("CACHE_WARM_THRESHOLD", 5),
                hot_threshold: env_parse("CACHE_HOT_THRESHOLD", 10),
            },
            kafka_bootstrap_servers: env_or("KAFKA_BOOTSTRAP_SERVERS", "kafka:9092"),
            kafka_click_topic: env_or("KAFKA_CLICK_TOPIC", "url-click-events"),
            listen_addr: env_or("LISTEN_ADDR", "0.0.0.0:8082"),
        })
    }
}
