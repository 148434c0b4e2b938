//! Event Bus Consumer (C10): ≥3 concurrent `StreamConsumer` workers feeding
//! one shared [`ClickBatcher`].

use std::sync::Arc;
use std::time::Duration;

use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::{ClientConfig, Message};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use urlshort_core::model::ClickEvent;

use crate::batcher::{ClickBatcher, RawEventSink};

#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    pub bootstrap_servers: String,
    pub topic: String,
    pub group_id: String,
    /// Spec floor is 3; values below are raised to 3.
    pub worker_count: usize,
    /// Upper bound on messages drained in one burst before yielding back to
    /// the shutdown-check/select loop (approximates "up to 500 per batch").
    pub max_poll_records: usize,
}

fn create_consumer(config: &ConsumerConfig, client_id: &str) -> anyhow::Result<StreamConsumer> {
    let consumer: StreamConsumer = ClientConfig::new()
        .set("bootstrap.servers", &config.bootstrap_servers)
        .set("group.id", &config.group_id)
        .set("client.id", client_id)
        .set("enable.auto.commit", "false")
        .set("auto.offset.reset", "earliest")
        .set("session.timeout.ms", "30000")
        .create()?;
    consumer.subscribe(&[config.topic.as_str()])?;
    Ok(consumer)
}

async fn handle_payload<S: RawEventSink + 'static>(
    batcher: &ClickBatcher<S>,
    payload: Option<&[u8]>,
) {
    let Some(payload) = payload else { return };
    match serde_json::from_slice::<ClickEvent>(payload) {
        Ok(event) => {
            if batcher.push(event).await {
                if let Err(e) = batcher.flush().await {
                    tracing::warn!(error = %e, "threshold-triggered flush failed");
                }
            }
        }
        Err(e) => tracing::warn!(error = %e, "invalid click event payload, dropping"),
    }
}

/// Spawns `worker_count` (floor 3) independent consumer tasks, each polling
/// the topic and appending decoded events to `batcher`. Returns the join
/// handles so the caller can await graceful shutdown.
pub fn spawn_workers<S: RawEventSink + 'static>(
    config: ConsumerConfig,
    batcher: Arc<ClickBatcher<S>>,
    shutdown: watch::Receiver<bool>,
) -> Vec<JoinHandle<()>> {
    let worker_count = config.worker_count.max(3);
    (0..worker_count)
        .map(|i| {
            let config = config.clone();
            let batcher = Arc::clone(&batcher);
            let mut shutdown = shutdown.clone();
            tokio::spawn(async move {
                let client_id = format!("{}-{}", config.group_id, i);
                let consumer = match create_consumer(&config, &client_id) {
                    Ok(c) => c,
                    Err(e) => {
                        tracing::error!(error = %e, worker = i, "failed to create kafka consumer");
                        return;
                    }
                };
                tracing::info!(worker = i, topic = %config.topic, "consumer worker started");

                loop {
                    tokio::select! {
                        msg = consumer.recv() => {
                            match msg {
                                Ok(m) => {
                                    handle_payload(&batcher, m.payload()).await;
                                    if let Err(e) = consumer.commit_message(&m, CommitMode::Async) {
                                        tracing::warn!(error = %e, "kafka commit failed");
                                    }

                                    // Drain a short burst without yielding back to the
                                    // shutdown-select, approximating "up to N per batch".
                                    for _ in 0..config.max_poll_records.saturating_sub(1) {
                                        match tokio::time::timeout(Duration::from_millis(1), consumer.recv()).await {
                                            Ok(Ok(m2)) => {
                                                handle_payload(&batcher, m2.payload()).await;
                                                if let Err(e) = consumer.commit_message(&m2, CommitMode::Async) {
                                                    tracing::warn!(error = %e, "kafka commit failed");
                                                }
                                            }
                                            _ => break,
                                        }
                                    }
                                }
                                Err(e) => tracing::warn!(error = %e, "kafka recv error"),
                            }
                        }
                        _ = shutdown.changed() => {
                            if *shutdown.borrow() {
                                tracing::info!(worker = i, "consumer worker shutting down");
                                break;
                            }
                        }
                    }
                }
            })
        })
        .collect()
}
