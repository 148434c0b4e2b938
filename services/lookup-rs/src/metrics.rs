use prometheus::{IntCounter, IntCounterVec, Opts, Registry};
use std::sync::OnceLock;

#[allow(dead_code)]
pub struct AppMetrics {
    pub db_reads_total: IntCounter,
    pub cache_hits_total: IntCounter,
    pub cache_misses_total: IntCounter,
    pub redis_ops_total: IntCounter,
    pub kafka_publish_total: IntCounter,
    pub touch_errors_total: IntCounter,
    pub http_requests_total: IntCounterVec,
}

static METRICS: OnceLock<AppMetrics> = OnceLock::new();

pub fn init(registry: &Registry) -> &'static AppMetrics {
    METRICS.get_or_init(|| {
        let db_reads =
            IntCounter::with_opts(Opts::new("lookup_db_reads_total", "DB reads from lookup-rs"))
                .unwrap();
        let cache_hits =
            IntCounter::with_opts(Opts::new("lookup_cache_hits_total", "Cache hits")).unwrap();
        let cache_misses =
            IntCounter::with_opts(Opts::new("lookup_cache_misses_total", "Cache misses")).unwrap();
        let redis_ops =
            IntCounter::with_opts(Opts::new("lookup_redis_ops_total", "Redis operations"))
                .unwrap();
        let kafka_publish = IntCounter::with_opts(Opts::new(
            "lookup_kafka_publish_total",
            "Click events published to the bus",
        ))
        .unwrap();
        let touch_errors = IntCounter::with_opts(Opts::new(
            "lookup_touch_errors_total",
            "Access-touch failures (observability only, swallowed)",
        ))
        .unwrap();
        let http_reqs = IntCounterVec::new(
            Opts::new("http_requests_total", "HTTP requests by handler and status"),
            &["handler", "method", "status_code"],
        )
        .unwrap();

        registry.register(Box::new(db_reads.clone())).ok();
        registry.register(Box::new(cache_hits.clone())).ok();
        registry.register(Box::new(cache_misses.clone())).ok();
        registry.register(Box::new(redis_ops.clone())).ok();
        registry.register(Box::new(kafka_publish.clone())).ok();
        registry.register(Box::new(touch_errors.clone())).ok();
        registry.register(Box::new(http_reqs.clone())).ok();

        AppMetrics {
            db_reads_total: db_reads,
            cache_hits_total: cache_hits,
            cache_misses_total: cache_misses,
            redis_ops_total: redis_ops,
            kafka_publish_total: kafka_publish,
            touch_errors_total: touch_errors,
            http_requests_total: http_reqs,
        }
    })
}

pub fn gather(registry: &Registry) -> String {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();
    let mut buf = Vec::new();
    encoder.encode(&registry.gather(), &mut buf).unwrap();
    String::from_utf8(buf).unwrap()
}
