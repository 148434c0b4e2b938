//! Shared types and helpers used by every url-shortener service.
//!
//! Mirrors the per-binary `config.rs`/`enums.rs`/`models.rs` modules of the
//! original single-binary layout, lifted into one crate so the generator,
//! stores, cache and event bus all agree on one set of types (see DESIGN.md).

pub mod base62;
pub mod config;
pub mod error;
pub mod model;

pub use error::{ApiError, ApiResult};
