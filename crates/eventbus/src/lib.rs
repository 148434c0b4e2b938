//! Event Bus Producer (C9) + Consumer/Batcher (C10) + geo collaborator.

pub mod batcher;
pub mod consumer;
pub mod geo;
pub mod producer;

pub use batcher::{BatcherConfig, ClickBatcher, RawEventSink};
pub use consumer::ConsumerConfig;
pub use geo::{DeterministicGeoResolver, GeoResolver};
