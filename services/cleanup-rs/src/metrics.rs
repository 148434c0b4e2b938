use prometheus::{IntCounter, Registry};

pub struct WorkerMetrics {
    pub deleted_total: IntCounter,
    pub passes_total: IntCounter,
    pub pass_failures_total: IntCounter,
}

pub fn init(registry: &Registry) -> WorkerMetrics {
    let deleted =
        IntCounter::new("cleanup_deleted_total", "Mappings deleted by the cleanup worker").unwrap();
    let passes = IntCounter::new("cleanup_passes_total", "Completed cleanup passes").unwrap();
    let failures =
        IntCounter::new("cleanup_pass_failures_total", "Cleanup passes aborted by an error")
            .unwrap();
    registry.register(Box::new(deleted.clone())).ok();
    registry.register(Box::new(passes.clone())).ok();
    registry.register(Box::new(failures.clone())).ok();
    WorkerMetrics {
        deleted_total: deleted,
        passes_total: passes,
        pass_failures_total: failures,
    }
}
