use std::time::Duration;

use urlshort_core::config::{env, env_or, env_parse, normalize_postgres_dsn};
use urlshort_eventbus::{BatcherConfig, ConsumerConfig};

/// The Stats service's env-configured settings: consumer/batcher, aggregator,
/// and the query API's own DB/listen address.
#[derive(Debug, Clone)]
pub struct Config {
    pub app_env: String,
    pub stats_database_url: String,

    pub kafka_bootstrap_servers: String,
    pub kafka_click_topic: String,
    pub consumer_group: String,
    pub consumer_worker_count: usize,
    pub consumer_max_poll_records: usize,

    pub batch_size: usize,
    pub flush_interval: Duration,

    pub aggregator_enabled: bool,
    pub aggregator_interval: Duration,
    pub aggregator_timezone: String,

    pub listen_addr: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Ok(Self {
            app_env: env_or("APP_ENV", "development"),
            stats_database_url: normalize_postgres_dsn(env("STATS_DATABASE_URL")?),
            kafka_bootstrap_servers: env_or("KAFKA_BOOTSTRAP_SERVERS", "kafka:9092"),
            kafka_click_topic: env_or("KAFKA_CLICK_TOPIC", "url-click-events"),
            consumer_group: env_or("STATS_CONSUMER_GROUP", "url_click_stats_group"),
            consumer_worker_count: env_parse("STATS_CONSUMER_WORKERS", 3),
            consumer_max_poll_records: env_parse("STATS_CONSUMER_MAX_POLL_RECORDS", 500),
            batch_size: env_parse("STATS_BATCH_SIZE", 100),
            flush_interval: Duration::from_secs(env_parse("STATS_FLUSH_INTERVAL_SECONDS", 5)),
            aggregator_enabled: env_parse("STATS_AGGREGATOR_ENABLED", true),
            aggregator_interval: Duration::from_secs(env_parse(
                "STATS_AGGREGATOR_INTERVAL_SECONDS",
                600,
            )),
            aggregator_timezone: env_or("STATS_AGGREGATOR_TIMEZONE", "UTC"),
            listen_addr: env_or("LISTEN_ADDR", "0.0.0.0:8083"),
        })
    }

    pub fn consumer_config(&self) -> ConsumerConfig {
        ConsumerConfig {
            bootstrap_servers: self.kafka_bootstrap_servers.clone(),
            topic: self.kafka_click_topic.clone(),
            group_id: self.consumer_group.clone(),
            worker_count: self.consumer_worker_count,
            max_poll_records: self.consumer_max_poll_records,
        }
    }

    pub fn batcher_config(&self) -> BatcherConfig {
        BatcherConfig {
            batch_size: self.batch_size,
            flush_interval: self.flush_interval,
        }
    }
}
