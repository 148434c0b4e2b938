use serde::{Deserialize, Serialize};
use urlshort_core::model::{HealthStatus, UrlMapping};

#[derive(Debug, Deserialize)]
pub struct ShortenRequest {
    pub original_url: String,
    pub base_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ShortenResponse {
    pub original_url: String,
    pub short_url: String,
    pub short_code: String,
    pub success: bool,
}

impl ShortenResponse {
    pub fn from_mapping(mapping: &UrlMapping, base_url: &str) -> Self {
        Self {
            original_url: mapping.original_url.clone(),
            short_url: format!("{}/{}", base_url, mapping.short_code),
            short_code: mapping.short_code.clone(),
            success: true,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub database: HealthStatus,
}
