use prometheus::{IntCounter, IntCounterVec, Opts, Registry};
use std::sync::OnceLock;

#[allow(dead_code)]
pub struct AppMetrics {
    pub kafka_events_total: IntCounter,
    pub flush_total: IntCounter,
    pub flush_failures_total: IntCounter,
    pub aggregation_runs_total: IntCounter,
    pub http_requests_total: IntCounterVec,
}

static METRICS: OnceLock<AppMetrics> = OnceLock::new();

pub fn init(registry: &Registry) -> &'static AppMetrics {
    METRICS.get_or_init(|| {
        let kafka_events = IntCounter::with_opts(Opts::new(
            "stats_kafka_events_total",
            "Click events consumed from the bus",
        ))
        .unwrap();
        let flush = IntCounter::with_opts(Opts::new(
            "stats_flush_total",
            "Batcher flushes into the raw events table",
        ))
        .unwrap();
        let flush_failures = IntCounter::with_opts(Opts::new(
            "stats_flush_failures_total",
            "Batcher flushes that failed",
        ))
        .unwrap();
        let aggregation_runs = IntCounter::with_opts(Opts::new(
            "stats_aggregation_runs_total",
            "Completed aggregator passes",
        ))
        .unwrap();
        let http_reqs = IntCounterVec::new(
            Opts::new("http_requests_total", "HTTP requests by handler and status"),
            &["handler", "method", "status_code"],
        )
        .unwrap();

        registry.register(Box::new(kafka_events.clone())).ok();
        registry.register(Box::new(flush.clone())).ok();
        registry.register(Box::new(flush_failures.clone())).ok();
        registry.register(Box::new(aggregation_runs.clone())).ok();
        registry.register(Box::new(http_reqs.clone())).ok();

        AppMetrics {
            kafka_events_total: kafka_events,
            flush_total: flush,
            flush_failures_total: flush_failures,
            aggregation_runs_total: aggregation_runs,
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
