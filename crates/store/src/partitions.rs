//! Monthly range partitioning for `url_mappings`, partitioned by `created_date`
//! (§4.3). A bootstrapping routine ensures partitions exist for the current
//! month and the next twelve at startup.

use chrono::{Datelike, NaiveDate, Utc};
use sqlx::PgPool;

const ADVISORY_LOCK_KEY: i64 = 0x75726c5f6d6170; // "url_map" in hex, arbitrary but stable

fn month_start(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).expect("valid year/month")
}

fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

fn partition_name(year: i32, month: u32) -> String {
    format!("url_mappings_y{year:04}m{month:02}")
}

/// Runs schema setup + partition bootstrap under a session advisory lock so
/// only one of N concurrently-starting instances performs DDL.
pub async fn migrate(pool: &PgPool, lookahead_months: u32) -> anyhow::Result<()> {
    sqlx::query("SELECT pg_advisory_lock($1)")
        .bind(ADVISORY_LOCK_KEY)
        .execute(pool)
        .await?;

    let result = migrate_inner(pool, lookahead_months).await;

    sqlx::query("SELECT pg_advisory_unlock($1)")
        .bind(ADVISORY_LOCK_KEY)
        .execute(pool)
        .await?;

    result
}

async fn migrate_inner(pool: &PgPool, lookahead_months: u32) -> anyhow::Result<()> {
    refuse_nonempty_legacy_table(pool).await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS url_mappings (
            id               BIGSERIAL,
            original_url     TEXT NOT NULL,
            short_code       VARCHAR(10) NOT NULL,
            created_at       TIMESTAMPTZ NOT NULL DEFAULT now(),
            created_date     DATE NOT NULL,
            expires_at       TIMESTAMPTZ NOT NULL,
            access_count     BIGINT NOT NULL DEFAULT 0,
            last_accessed_at TIMESTAMPTZ,
            shard_id         INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (id, created_date)
        ) PARTITION BY RANGE (created_date)
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_url_mappings_short_code ON url_mappings (short_code)")
        .execute(pool)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_url_mappings_original_url ON url_mappings (original_url)",
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_url_mappings_created_date ON url_mappings (created_date)",
    )
    .execute(pool)
    .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_url_mappings_expires_at ON url_mappings (expires_at)")
        .execute(pool)
        .await?;

    ensure_partitions(pool, lookahead_months).await?;
    Ok(())
}

/// An empty legacy non-partitioned table may be migrated in place; a non-empty
/// one must not be mutated automatically (spec.md §9 Open Question, resolved).
async fn refuse_nonempty_legacy_table(pool: &PgPool) -> anyhow::Result<()> {
    let is_partitioned: Option<(bool,)> = sqlx::query_as(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM pg_partitioned_table pt
            JOIN pg_class c ON c.oid = pt.partrelid
            WHERE c.relname = 'url_mappings'
        )
        "#,
    )
    .fetch_optional(pool)
    .await?;

    let table_exists: Option<(bool,)> =
        sqlx::query_as("SELECT EXISTS (SELECT 1 FROM pg_class WHERE relname = 'url_mappings')")
            .fetch_optional(pool)
            .await?;

    let exists = matches!(table_exists, Some((true,)));
    let partitioned = matches!(is_partitioned, Some((true,)));

    if exists && !partitioned {
        let count: (i64,) = sqlx::query_as("SELECT count(*) FROM url_mappings")
            .fetch_one(pool)
            .await?;
        if count.0 > 0 {
            anyhow::bail!(
                "refusing to migrate non-empty legacy non-partitioned url_mappings table \
                 ({} rows); manual migration required",
                count.0
            );
        }
        // Empty legacy table: drop it so the partitioned CREATE TABLE below can
        // take the name.
        sqlx::query("DROP TABLE url_mappings").execute(pool).await?;
    }
    Ok(())
}

/// Ensures month-wide partitions exist for the current month and the next
/// `lookahead_months`.
pub async fn ensure_partitions(pool: &PgPool, lookahead_months: u32) -> anyhow::Result<()> {
    let today = Utc::now().date_naive();
    let (mut year, mut month) = (today.year(), today.month());

    for _ in 0..=lookahead_months {
        let from = month_start(year, month);
        let (ny, nm) = next_month(year, month);
        let to = month_start(ny, nm);
        let name = partition_name(year, month);

        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS {name} PARTITION OF url_mappings \
             FOR VALUES FROM ('{from}') TO ('{to}')"
        );
        sqlx::query(&ddl).execute(pool).await?;

        year = ny;
        month = nm;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_month_rolls_over_year() {
        assert_eq!(next_month(2026, 12), (2027, 1));
        assert_eq!(next_month(2026, 1), (2026, 2));
    }

    #[test]
    fn partition_name_is_stable() {
        assert_eq!(partition_name(2026, 7), "url_mappings_y2026m07");
    }
}
