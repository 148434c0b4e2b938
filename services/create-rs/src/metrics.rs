use prometheus::{IntCounter, IntCounterVec, Opts, Registry};
use std::sync::OnceLock;

#[allow(dead_code)]
pub struct AppMetrics {
    pub db_reads_total: IntCounter,
    pub db_writes_total: IntCounter,
    pub generator_attempts_total: IntCounter,
    pub generator_exhausted_total: IntCounter,
    pub unique_violation_retries_total: IntCounter,
    pub http_requests_total: IntCounterVec,
}

static METRICS: OnceLock<AppMetrics> = OnceLock::new();

pub fn init(registry: &Registry) -> &'static AppMetrics {
    METRICS.get_or_init(|| {
        let db_reads =
            IntCounter::with_opts(Opts::new("create_db_reads_total", "DB reads from create-rs"))
                .unwrap();
        let db_writes = IntCounter::with_opts(Opts::new(
            "create_db_writes_total",
            "DB writes from create-rs",
        ))
        .unwrap();
        let gen_attempts = IntCounter::with_opts(Opts::new(
            "create_generator_attempts_total",
            "Code generator draw attempts",
        ))
        .unwrap();
        let gen_exhausted = IntCounter::with_opts(Opts::new(
            "create_generator_exhausted_total",
            "Code generator attempt-budget exhaustions",
        ))
        .unwrap();
        let unique_retries = IntCounter::with_opts(Opts::new(
            "create_unique_violation_retries_total",
            "Insert retries after a short_code unique violation",
        ))
        .unwrap();
        let http_reqs = IntCounterVec::new(
            Opts::new("http_requests_total", "HTTP requests by handler and status"),
            &["handler", "method", "status_code"],
        )
        .unwrap();

        registry.register(Box::new(db_reads.clone())).ok();
        registry.register(Box::new(db_writes.clone())).ok();
        registry.register(Box::new(gen_attempts.clone())).ok();
        registry.register(Box::new(gen_exhausted.clone())).ok();
        registry.register(Box::new(unique_retries.clone())).ok();
        registry.register(Box::new(http_reqs.clone())).ok();

        AppMetrics {
            db_reads_total: db_reads,
            db_writes_total: db_writes,
            generator_attempts_total: gen_attempts,
            generator_exhausted_total: gen_exhausted,
            unique_violation_retries_total: unique_retries,
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
