//! Mapping Store (C3): read/write-split relational access to `url_mappings`,
//! partitioned by `created_date`. Read-only operations route to a healthy
//! replica (round robin) or fall back to the primary; writes always use the
//! primary. Routing is per-operation, never per-request (§4.3, §9).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use urlshort_core::model::{NewUrlMapping, UrlMapping};

use crate::health::ReplicaHealthMonitor;

pub struct MappingStore {
    primary: PgPool,
    health: Arc<ReplicaHealthMonitor>,
    rr: AtomicUsize,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("capacity exhausted")]
    CapacityExhausted,
}

impl MappingStore {
    pub fn new(primary: PgPool, health: Arc<ReplicaHealthMonitor>) -> Self {
        Self {
            primary,
            health,
            rr: AtomicUsize::new(0),
        }
    }

    pub fn primary_pool(&self) -> &PgPool {
        &self.primary
    }

    /// Round-robin over healthy replicas; falls through to the primary if
    /// none are healthy. A fresh selection is made on every call (operations
    /// are the routing unit, not requests).
    fn read_pool(&self) -> PgPool {
        let n = self.health.replica_count();
        if n == 0 {
            return self.primary.clone();
        }
        let start = self.rr.fetch_add(1, Ordering::Relaxed);
        for offset in 0..n {
            let idx = (start + offset) % n;
            if self.health.healthy(idx) {
                return self.health.replica_pool(idx).clone();
            }
        }
        self.primary.clone()
    }

    pub async fn find_by_short(&self, code: &str) -> Result<Option<UrlMapping>, StoreError> {
        let pool = self.read_pool();
        let row = sqlx::query_as::<_, UrlMapping>(
            "SELECT id, original_url, short_code, created_at, created_date, expires_at, \
             access_count, last_accessed_at, shard_id FROM url_mappings WHERE short_code = $1",
        )
        .bind(code)
        .fetch_optional(&pool)
        .await?;
        Ok(row)
    }

    /// Used for Create's dedupe check. If concurrent creators raced and two
    /// rows exist for the same `original_url`, the oldest wins so repeated
    /// lookups converge on one short code (P2).
    pub async fn find_by_original(&self, url: &str) -> Result<Option<UrlMapping>, StoreError> {
        let pool = self.read_pool();
        let row = sqlx::query_as::<_, UrlMapping>(
            "SELECT id, original_url, short_code, created_at, created_date, expires_at, \
             access_count, last_accessed_at, shard_id FROM url_mappings \
             WHERE original_url = $1 ORDER BY created_at ASC LIMIT 1",
        )
        .bind(url)
        .fetch_optional(&pool)
        .await?;
        Ok(row)
    }

    pub async fn exists_short(&self, code: &str) -> Result<bool, StoreError> {
        let pool = self.read_pool();
        let row: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM url_mappings WHERE short_code = $1)")
                .bind(code)
                .fetch_one(&pool)
                .await?;
        Ok(row.0)
    }

    /// Write path, primary only. `created_date` is derived from `created_at`
    /// here (I3), never taken from the caller.
    pub async fn insert(&self, new: NewUrlMapping) -> Result<UrlMapping, StoreError> {
        debug_assert!(new.expires_at > new.created_at, "I2 violated by caller");
        let created_date = new.created_at.date_naive();
        let row = sqlx::query_as::<_, UrlMapping>(
            r#"
            INSERT INTO url_mappings
                (original_url, short_code, created_at, created_date, expires_at, access_count, last_accessed_at, shard_id)
            VALUES ($1, $2, $3, $4, $5, 0, NULL, $6)
            RETURNING id, original_url, short_code, created_at, created_date, expires_at, access_count, last_accessed_at, shard_id
            "#,
        )
        .bind(&new.original_url)
        .bind(&new.short_code)
        .bind(new.created_at)
        .bind(created_date)
        .bind(new.expires_at)
        .bind(new.shard_id)
        .fetch_one(&self.primary)
        .await?;
        Ok(row)
    }

    /// `true` if the insert failed due to the `short_code` already existing
    /// (the residual race §4.6 tolerates via bounded retry).
    pub fn is_unique_violation(err: &StoreError) -> bool {
        matches!(
            err,
            StoreError::Db(sqlx::Error::Database(db_err)) if db_err.is_unique_violation()
        )
    }

    /// Blind idempotent increment (I4): caller computes the new `access_count`;
    /// concurrent touches last-writer-wins, exact monotonic counting is not
    /// required (§5). Always a fresh primary connection — callers invoking
    /// this from inside a read-only Lookup path must not hold that read
    /// context open across the call (§4.3, §9).
    pub async fn touch_access(
        &self,
        id: i64,
        access_count: i64,
        last_accessed_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE url_mappings SET access_count = $1, last_accessed_at = $2 WHERE id = $3",
        )
        .bind(access_count)
        .bind(last_accessed_at)
        .bind(id)
        .execute(&self.primary)
        .await?;
        Ok(())
    }

    /// Deletes up to `limit` mappings matching the retention/expiry predicate
    /// (P7), returning the number actually deleted. Each call is its own
    /// short-lived write context; the caller (Cleanup Worker) decides when to
    /// stop issuing batches.
    pub async fn delete_batch(
        &self,
        access_cutoff: DateTime<Utc>,
        now: DateTime<Utc>,
        limit: i64,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            WITH victims AS (
                SELECT id, created_date FROM url_mappings
                WHERE last_accessed_at < $1
                   OR (last_accessed_at IS NULL AND created_at < $1)
                   OR expires_at < $2
                LIMIT $3
            )
            DELETE FROM url_mappings u
            USING victims v
            WHERE u.id = v.id AND u.created_date = v.created_date
            "#,
        )
        .bind(access_cutoff)
        .bind(now)
        .bind(limit)
        .execute(&self.primary)
        .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_unique_violation_false_for_other_errors() {
        let err = StoreError::CapacityExhausted;
        assert!(!MappingStore::is_unique_violation(&err));
    }
}
