//! Data model (§3): `UrlMapping`, `ClickEvent`, `UrlStatistics`, and the small
//! enums shared across services. Field names and invariants match spec.md
//! exactly; this module only carries the (de)serialization/DB-row glue.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The authoritative short<->long binding (I1-I4). Owned by the Create/Lookup
/// domain; lives in the primary/replica-split `url_mappings` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UrlMapping {
    pub id: i64,
    pub original_url: String,
    pub short_code: String,
    pub created_at: DateTime<Utc>,
    pub created_date: NaiveDate,
    pub expires_at: DateTime<Utc>,
    pub access_count: i64,
    pub last_accessed_at: Option<DateTime<Utc>>,
    pub shard_id: i32,
}

/// Fields needed to insert a new mapping; `id`/`created_date` are derived by
/// the store (I3 is enforced there, not by the caller).
#[derive(Debug, Clone)]
pub struct NewUrlMapping {
    pub original_url: String,
    pub short_code: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub shard_id: i32,
}

/// Click-event device classification (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeviceType {
    Mobile,
    Tablet,
    Desktop,
    Unknown,
}

impl DeviceType {
    /// Best-effort classification from a User-Agent string.
    pub fn from_user_agent(ua: &str) -> Self {
        let ua = ua.to_ascii_lowercase();
        if ua.contains("tablet") || ua.contains("ipad") {
            DeviceType::Tablet
        } else if ua.contains("mobi") || ua.contains("android") || ua.contains("iphone") {
            DeviceType::Mobile
        } else if ua.is_empty() {
            DeviceType::Unknown
        } else {
            DeviceType::Desktop
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Mobile => "MOBILE",
            DeviceType::Tablet => "TABLET",
            DeviceType::Desktop => "DESKTOP",
            DeviceType::Unknown => "UNKNOWN",
        }
    }
}

impl std::str::FromStr for DeviceType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MOBILE" => Ok(DeviceType::Mobile),
            "TABLET" => Ok(DeviceType::Tablet),
            "DESKTOP" => Ok(DeviceType::Desktop),
            _ => Ok(DeviceType::Unknown),
        }
    }
}

/// A single observed click, as carried on the bus and in the raw events
/// table. Producers must tolerate `country`/`city`/`referrer` being absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClickEvent {
    pub short_code: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub device_type: DeviceType,
    /// Milliseconds since epoch, per spec.md §3.
    pub timestamp: i64,
}

impl ClickEvent {
    pub fn clicked_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.timestamp).unwrap_or_else(Utc::now)
    }
}

/// One row per observed `short_code`; eventually-consistent projection of the
/// raw `ClickEvent` stream (§3 invariant: re-aggregation reproduces stored
/// values modulo events arriving after the aggregation cut-off).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UrlStatistics {
    pub short_code: String,
    pub total_clicks: i64,
    pub clicks_today: i64,
    pub clicks_this_week: i64,
    pub clicks_this_month: i64,
    pub first_click_at: Option<DateTime<Utc>>,
    pub last_click_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// Health check status values, shared by every service's `/health` endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}
