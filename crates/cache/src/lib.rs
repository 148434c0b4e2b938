//! Cache Layer (C5): a keyed string cache with adaptive sliding TTL. Built on
//! `redis::aio::ConnectionManager`, with hot/warm/cold tiers: a key's TTL
//! steps up the tier ladder as its access count on the cached entry grows.

use std::sync::Arc;
use std::time::Duration;

use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub key_prefix: String,
    pub access_counter_prefix: String,
    pub cold_ttl: Duration,
    pub warm_ttl: Duration,
    pub hot_ttl: Duration,
    pub warm_threshold: i64,
    pub hot_threshold: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            key_prefix: "url".to_string(),
            access_counter_prefix: "access".to_string(),
            cold_ttl: Duration::from_secs(10 * 60),
            warm_ttl: Duration::from_secs(15 * 60),
            hot_ttl: Duration::from_secs(30 * 60),
            warm_threshold: 5,
            hot_threshold: 10,
        }
    }
}

impl CacheConfig {
    /// Tier TTL for an observed access count (P5: crossing a threshold can
    /// only move the TTL up, never down, because thresholds are monotone in
    /// `access_count` and `access_count` never decreases within a TTL window).
    fn ttl_for_count(&self, count: i64) -> Duration {
        if count >= self.hot_threshold {
            self.hot_ttl
        } else if count >= self.warm_threshold {
            self.warm_ttl
        } else {
            self.cold_ttl
        }
    }
}

pub async fn create_client(url: &str) -> anyhow::Result<ConnectionManager> {
    let client = redis::Client::open(url)?;
    let mgr = ConnectionManager::new(client).await?;
    Ok(mgr)
}

/// The cache is a keyed byte store with TTL; this wraps a single
/// `ConnectionManager` but the interface imposes no consistency guarantee
/// stronger than per-key last-writer-wins, so a sharded/clustered Redis is a
/// drop-in swap at construction time (§4.5 "Topology").
pub struct CacheLayer {
    conn: Arc<Mutex<ConnectionManager>>,
    config: CacheConfig,
}

impl CacheLayer {
    pub fn new(conn: ConnectionManager, config: CacheConfig) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            config,
        }
    }

    pub fn url_key(&self, short_code: &str) -> String {
        format!("{}:{}", self.config.key_prefix, short_code)
    }

    fn access_key(&self, key: &str) -> String {
        format!("{}:{}", self.config.access_counter_prefix, key)
    }

    /// On hit, kicks off a detached best-effort TTL/counter refresh and
    /// returns the cached value immediately — the caller's functional result
    /// never waits on the bookkeeping (§4.5).
    pub async fn get(&self, key: &str) -> Option<String> {
        let value: Option<String> = {
            let mut conn = self.conn.lock().await;
            conn.get(key).await.ok()?
        };
        if value.is_some() {
            self.spawn_hit_refresh(key.to_string());
        }
        value
    }

    fn spawn_hit_refresh(&self, key: String) {
        let conn = Arc::clone(&self.conn);
        let access_key = self.access_key(&key);
        let config = self.config.clone();
        tokio::spawn(async move {
            let mut conn = conn.lock().await;
            let count: i64 = match conn.incr(&access_key, 1i64).await {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!(error = %e, "cache: access counter incr failed");
                    return;
                }
            };
            let ttl = config.ttl_for_count(count).as_secs() as i64;
            if let Err(e) = conn.expire::<_, ()>(&key, ttl).await {
                tracing::warn!(error = %e, "cache: sliding TTL refresh failed");
            }
            // The access counter expires alongside the value to bound memory.
            if let Err(e) = conn.expire::<_, ()>(&access_key, ttl).await {
                tracing::warn!(error = %e, "cache: access counter expiry refresh failed");
            }
        });
    }

    pub async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> anyhow::Result<()> {
        let ttl = ttl.unwrap_or(self.config.cold_ttl);
        let mut conn = self.conn.lock().await;
        let _: () = conn.set_ex(key, value, ttl.as_secs()).await?;
        Ok(())
    }

    pub async fn remove(&self, key: &str) -> anyhow::Result<()> {
        let mut conn = self.conn.lock().await;
        let _: () = conn.del(key).await?;
        Ok(())
    }

    pub async fn exists(&self, key: &str) -> anyhow::Result<bool> {
        let mut conn = self.conn.lock().await;
        let exists: bool = conn.exists(key).await?;
        Ok(exists)
    }

    pub async fn ping(&self) -> anyhow::Result<()> {
        let mut conn = self.conn.lock().await;
        let _: String = redis::cmd("PING").query_async(&mut *conn).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttl_tier_is_monotone_across_thresholds() {
        let cfg = CacheConfig::default();
        assert_eq!(cfg.ttl_for_count(0), cfg.cold_ttl);
        assert_eq!(cfg.ttl_for_count(4), cfg.cold_ttl);
        assert_eq!(cfg.ttl_for_count(5), cfg.warm_ttl);
        assert_eq!(cfg.ttl_for_count(9), cfg.warm_ttl);
        assert_eq!(cfg.ttl_for_count(10), cfg.hot_ttl);
        assert_eq!(cfg.ttl_for_count(1000), cfg.hot_ttl);
        // P5: crossing a threshold never lowers the TTL tier.
        assert!(cfg.ttl_for_count(5) >= cfg.ttl_for_count(4));
        assert!(cfg.ttl_for_count(10) >= cfg.ttl_for_count(9));
    }

    #[test]
    fn url_key_uses_configured_prefix() {
        let cfg = CacheConfig {
            key_prefix: "url".to_string(),
            ..CacheConfig::default()
        };
        // Constructing a full CacheLayer needs a live connection; the key
        // format itself is pure and tested directly here instead.
        assert_eq!(format!("{}:{}", cfg.key_prefix, "abc123"), "url:abc123");
    }
}
