use std::sync::Arc;

use prometheus::Registry;
use sqlx::PgPool;
use urlshort_store::{MappingStore, ReplicaHealthMonitor};

use crate::config::Config;
use crate::generator::CodeGenerator;
use crate::metrics::AppMetrics;

pub struct AppState {
    pub config: Config,
    pub store: Arc<MappingStore>,
    pub health: Arc<ReplicaHealthMonitor>,
    pub generator: CodeGenerator,
    pub primary: PgPool,
    pub metrics: &'static AppMetrics,
    pub registry: Registry,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<MappingStore>,
        health: Arc<ReplicaHealthMonitor>,
        primary: PgPool,
        metrics: &'static AppMetrics,
        registry: Registry,
    ) -> Arc<Self> {
        let generator = CodeGenerator::new(
            Arc::clone(&store),
            config.generator_attempt_budget,
            config.generator_range_max,
        );
        Arc::new(Self {
            config,
            store,
            health,
            generator,
            primary,
            metrics,
            registry,
        })
    }
}
