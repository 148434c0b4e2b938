//! Event Bus Producer (C9): fire-and-log publish, keyed by `short_code` so
//! events for one code land on one partition (per-code ordering where the
//! bus supports it).

use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};
use std::time::Duration;
use urlshort_core::model::ClickEvent;

pub fn create_producer(bootstrap_servers: &str) -> anyhow::Result<FutureProducer> {
    let producer = ClientConfig::new()
        .set("bootstrap.servers", bootstrap_servers)
        .set("message.timeout.ms", "2000")
        .set("queue.buffering.max.messages", "100000")
        .set("queue.buffering.max.ms", "5")
        .create()?;
    Ok(producer)
}

/// Publish a click event. Never propagates errors: loss of events is
/// acceptable (the redirect is the canonical contract); callers on the
/// observational path only need to know whether to count it as published.
pub async fn publish_click(producer: &FutureProducer, topic: &str, event: &ClickEvent) -> bool {
    let payload = match serde_json::to_string(event) {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!(error = %e, "click event serialization failed");
            return false;
        }
    };
    let record = FutureRecord::to(topic)
        .payload(&payload)
        .key(&event.short_code);
    match producer.send(record, Duration::from_millis(500)).await {
        Ok(_) => true,
        Err((e, _)) => {
            tracing::warn!(error = %e, "click event publish failed");
            false
        }
    }
}
