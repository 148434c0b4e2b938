//! Replica Health Monitor (C4): liveness + replication-lag gating for read
//! routing. One monitor per `MappingStore`, shared by all read paths.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use sqlx::PgPool;
use tokio::sync::watch;
use tokio::task::JoinHandle;

const PROBE_INTERVAL: Duration = Duration::from_secs(30);
const PROBE_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);
const STALE_AFTER: Duration = Duration::from_secs(120);
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);
const DEFAULT_LAG_THRESHOLD_BYTES: i64 = 10 * 1024 * 1024;

struct HealthEntry {
    healthy: bool,
    checked_at: Instant,
}

pub struct ReplicaHealthMonitor {
    replicas: Vec<PgPool>,
    primary: PgPool,
    lag_threshold_bytes: i64,
    status: RwLock<HashMap<usize, HealthEntry>>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl ReplicaHealthMonitor {
    pub fn new(replicas: Vec<PgPool>, primary: PgPool, lag_threshold_bytes: Option<i64>) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            replicas,
            primary,
            lag_threshold_bytes: lag_threshold_bytes.unwrap_or(DEFAULT_LAG_THRESHOLD_BYTES),
            status: RwLock::new(HashMap::new()),
            shutdown_tx,
            shutdown_rx,
        }
    }

    pub fn replica_count(&self) -> usize {
        self.replicas.len()
    }

    pub fn replica_pool(&self, idx: usize) -> &PgPool {
        &self.replicas[idx]
    }

    /// `true` only if the last probe (within the staleness window) reported healthy.
    pub fn healthy(&self, idx: usize) -> bool {
        let guard = self.status.read().expect("health status lock poisoned");
        match guard.get(&idx) {
            Some(entry) => entry.healthy && entry.checked_at.elapsed() < STALE_AFTER,
            None => false,
        }
    }

    fn record(&self, idx: usize, healthy: bool) {
        let mut guard = self.status.write().expect("health status lock poisoned");
        guard.insert(
            idx,
            HealthEntry {
                healthy,
                checked_at: Instant::now(),
            },
        );
    }

    /// Probe = (1) connection acquired within 5s; (2) endpoint reports it is a
    /// replica (`pg_is_in_recovery()`); (3) estimated replication lag, if
    /// obtainable, is below the configured threshold.
    async fn probe_one(&self, idx: usize) -> bool {
        let pool = &self.replicas[idx];
        let mut conn = match tokio::time::timeout(PROBE_ACQUIRE_TIMEOUT, pool.acquire()).await {
            Ok(Ok(conn)) => conn,
            Ok(Err(e)) => {
                tracing::warn!(replica = idx, error = %e, "replica probe: acquire failed");
                return false;
            }
            Err(_) => {
                tracing::warn!(replica = idx, "replica probe: acquire timed out");
                return false;
            }
        };

        let in_recovery: Option<(bool,)> = sqlx::query_as("SELECT pg_is_in_recovery()")
            .fetch_optional(&mut *conn)
            .await
            .unwrap_or(None);
        if !matches!(in_recovery, Some((true,))) {
            tracing::warn!(replica = idx, "replica probe: not reporting as a replica");
            return false;
        }

        // Replication lag is "obtainable" best-effort; absence of the lsn
        // functions (e.g. a test double) does not fail the probe.
        let replica_lsn: Option<(String,)> =
            sqlx::query_as("SELECT pg_last_wal_receive_lsn()::text")
                .fetch_optional(&mut *conn)
                .await
                .unwrap_or(None);
        drop(conn);

        if let Some((lsn,)) = replica_lsn {
            let lag: Option<(i64,)> =
                sqlx::query_as("SELECT pg_wal_lsn_diff(pg_current_wal_lsn(), $1::pg_lsn)")
                    .bind(&lsn)
                    .fetch_optional(&self.primary)
                    .await
                    .unwrap_or(None);
            if let Some((lag_bytes,)) = lag {
                if lag_bytes > self.lag_threshold_bytes {
                    tracing::warn!(replica = idx, lag_bytes, "replica probe: lag over threshold");
                    return false;
                }
            }
        }

        true
    }

    async fn probe_all(&self) {
        for idx in 0..self.replicas.len() {
            let healthy = self.probe_one(idx).await;
            self.record(idx, healthy);
        }
    }

    /// Runs the initial probe, then spawns the periodic probe loop. Returns a
    /// handle the caller can pass to [`Self::shutdown`].
    pub async fn spawn(self: std::sync::Arc<Self>) -> JoinHandle<()> {
        self.probe_all().await;
        let monitor = std::sync::Arc::clone(&self);
        let mut shutdown_rx = monitor.shutdown_rx.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(PROBE_INTERVAL);
            ticker.tick().await; // first tick fires immediately; we already probed
            loop {
                tokio::select! {
                    _ = ticker.tick() => monitor.probe_all().await,
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }
        })
    }

    /// Signals the probe loop to stop and waits up to 5s for it to exit.
    pub async fn shutdown(&self, handle: JoinHandle<()>) {
        let _ = self.shutdown_tx.send(true);
        if tokio::time::timeout(SHUTDOWN_GRACE, handle).await.is_err() {
            tracing::warn!("replica health monitor did not stop within grace period");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_replica_is_unhealthy() {
        let monitor = ReplicaHealthMonitorStub::default();
        assert!(!monitor.healthy(0));
    }

    #[test]
    fn stale_entry_is_unhealthy() {
        let mut status = HashMap::new();
        status.insert(
            0,
            HealthEntry {
                healthy: true,
                checked_at: Instant::now() - Duration::from_secs(121),
            },
        );
        let guard = RwLock::new(status);
        let entry = guard.read().unwrap();
        let e = entry.get(&0).unwrap();
        assert!(!(e.healthy && e.checked_at.elapsed() < STALE_AFTER));
    }

    // Minimal stand-in exercising just the status map logic without a live pool.
    #[derive(Default)]
    struct ReplicaHealthMonitorStub {
        status: RwLock<HashMap<usize, HealthEntry>>,
    }

    impl ReplicaHealthMonitorStub {
        fn healthy(&self, idx: usize) -> bool {
            let guard = self.status.read().unwrap();
            match guard.get(&idx) {
                Some(entry) => entry.healthy && entry.checked_at.elapsed() < STALE_AFTER,
                None => false,
            }
        }
    }
}
