use prometheus::Registry;
use sqlx::PgPool;

use crate::metrics::AppMetrics;

pub struct AppState {
    pub pool: PgPool,
    pub metrics: &'static AppMetrics,
    pub registry: Registry,
}
