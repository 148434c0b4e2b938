//! Mapping Store (C3) + Replica Health Monitor (C4).

pub mod health;
pub mod partitions;
pub mod pool;
pub mod store;

pub use health::ReplicaHealthMonitor;
pub use store::{MappingStore, StoreError};
