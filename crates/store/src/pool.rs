//! Pool construction with fixed timeouts: 30s acquire, 10min idle, 30min max
//! lifetime. Supports configurable pool sizes and a primary/replica split.

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};

#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 20,
            min_connections: 2,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            max_lifetime: Duration::from_secs(1800),
        }
    }
}

pub async fn create_pool(dsn: &str, cfg: &PoolConfig) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(cfg.max_connections)
        .min_connections(cfg.min_connections)
        .acquire_timeout(cfg.acquire_timeout)
        .idle_timeout(cfg.idle_timeout)
        .max_lifetime(cfg.max_lifetime)
        .connect(dsn)
        .await?;
    Ok(pool)
}

pub async fn create_pools(dsns: &[String], cfg: &PoolConfig) -> anyhow::Result<Vec<PgPool>> {
    let mut pools = Vec::with_capacity(dsns.len());
    for dsn in dsns {
        pools.push(create_pool(dsn, cfg).await?);
    }
    Ok(pools)
}
