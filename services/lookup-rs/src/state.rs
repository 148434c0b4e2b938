use std::sync::Arc;

use prometheus::Registry;
use rdkafka::producer::FutureProducer;
use urlshort_cache::CacheLayer;
use urlshort_eventbus::{DeterministicGeoResolver, GeoResolver};
use urlshort_store::{MappingStore, ReplicaHealthMonitor};

use crate::config::Config;
use crate::metrics::AppMetrics;

pub struct AppState {
    pub config: Config,
    pub store: Arc<MappingStore>,
    pub health: Arc<ReplicaHealthMonitor>,
    pub cache: Arc<CacheLayer>,
    pub producer: FutureProducer,
    pub geo: Arc<dyn GeoResolver>,
    pub metrics: &'static AppMetrics,
    pub registry: Registry,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<MappingStore>,
        health: Arc<ReplicaHealthMonitor>,
        cache: Arc<CacheLayer>,
        producer: FutureProducer,
        metrics: &'static AppMetrics,
        registry: Registry,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            store,
            health,
            cache,
            producer,
            geo: Arc::new(DeterministicGeoResolver),
            metrics,
            registry,
        })
    }
}
