//! Code Generator (C2): draws a uniform integer in `[1, range_max]`, encodes
//! it as base62, and retries on collision up to `attempt_budget` times.

use std::sync::Arc;

use rand::Rng;
use urlshort_core::{base62, ApiError};
use urlshort_store::MappingStore;

pub struct CodeGenerator {
    store: Arc<MappingStore>,
    attempt_budget: u32,
    range_max: u64,
}

impl CodeGenerator {
    pub fn new(store: Arc<MappingStore>, attempt_budget: u32, range_max: u64) -> Self {
        Self {
            store,
            attempt_budget,
            range_max,
        }
    }

    /// Returns a short code not currently present in the Mapping Store, or
    /// `UrlGenerationFailed` once the attempt budget is exhausted.
    pub async fn next(&self) -> Result<String, ApiError> {
        for _ in 0..self.attempt_budget {
            let n = rand::thread_rng().gen_range(1..=self.range_max);
            let code = base62::encode(n);
            match self.store.exists_short(&code).await {
                Ok(false) => return Ok(code),
                Ok(true) => continue,
                Err(e) => {
                    tracing::error!(error = %e, "generator: existence check failed");
                    return Err(ApiError::InternalServerError);
                }
            }
        }
        tracing::error!(attempts = self.attempt_budget, "generator: capacity exhausted");
        Err(ApiError::UrlGenerationFailed)
    }
}
