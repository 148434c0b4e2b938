//! Closed error taxonomy, shared by every HTTP-facing service so the
//! response body shape is identical regardless of which service answered.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// The closed set of domain errors a client-facing endpoint may return.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("short code not found")]
    UrlNotFound,

    #[error("short code expired")]
    UrlExpired,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("internal server error")]
    InternalServerError,

    #[error("url generation failed")]
    UrlGenerationFailed,
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::UrlNotFound => "URL_NOT_FOUND",
            ApiError::UrlExpired => "URL_EXPIRED",
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::InternalServerError => "INTERNAL_SERVER_ERROR",
            ApiError::UrlGenerationFailed => "URL_GENERATION_FAILED",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::UrlNotFound | ApiError::UrlExpired => StatusCode::NOT_FOUND,
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::InternalServerError | ApiError::UrlGenerationFailed => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error_code: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Infrastructure faults on the critical path surface as INTERNAL_SERVER_ERROR
        // without leaking storage/cache/bus detail to the client; the detail still
        // reaches the logs via the `tracing::error!` call sites upstream.
        if matches!(status, StatusCode::INTERNAL_SERVER_ERROR) {
            tracing::error!(error_code = self.code(), "{self}");
        }
        let body = ErrorBody {
            error_code: self.code(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Infrastructure faults (sqlx/redis/rdkafka) on the critical path collapse to
/// `INTERNAL_SERVER_ERROR`; the concrete cause is still logged at the call
/// site before conversion.
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!(cause = %err, "database error on critical path");
        ApiError::InternalServerError
    }
}
