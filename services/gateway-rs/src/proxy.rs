//! Gateway Shell (C13): a thin reverse proxy over Create/Lookup/Stats.
//! Routing, health aggregation and CORS are the whole of this service —
//! everything else is named here only as a pass-through to C6/C7/C12.

use axum::{
    body::Bytes,
    extract::{OriginalUri, State},
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::state::AppState;

/// Forwards the inbound request verbatim (method, path+query, headers, body)
/// to `target_base` and relays the response back, minus hop-by-hop headers.
pub async fn forward(
    client: &reqwest::Client,
    target_base: &str,
    method: Method,
    path_and_query: &str,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let url = format!("{}{}", target_base.trim_end_matches('/'), path_and_query);

    let reqwest_method = match reqwest::Method::from_bytes(method.as_str().as_bytes()) {
        Ok(m) => m,
        Err(_) => return StatusCode::METHOD_NOT_ALLOWED.into_response(),
    };

    let mut req = client.request(reqwest_method, &url);
    for (name, value) in headers.iter() {
        if name == axum::http::header::HOST {
            continue;
        }
        req = req.header(name.as_str(), value.as_bytes());
    }
    req = req.body(body);

    match req.send().await {
        Ok(resp) => {
            let status = StatusCode::from_u16(resp.status().as_u16())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            let mut out_headers = HeaderMap::new();
            for (name, value) in resp.headers().iter() {
                if let (Ok(name), Ok(value)) = (
                    axum::http::HeaderName::from_bytes(name.as_str().as_bytes()),
                    axum::http::HeaderValue::from_bytes(value.as_bytes()),
                ) {
                    out_headers.insert(name, value);
                }
            }
            let body = resp.bytes().await.unwrap_or_default();
            (status, out_headers, body).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, url, "gateway: upstream request failed");
            StatusCode::BAD_GATEWAY.into_response()
        }
    }
}

pub async fn create_proxy(
    State(state): State<Arc<AppState>>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path_and_query = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");
    forward(
        &state.client,
        &state.config.create_base_url,
        method,
        path_and_query,
        headers,
        body,
    )
    .await
}

pub async fn stats_proxy(
    State(state): State<Arc<AppState>>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path_and_query = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");
    forward(
        &state.client,
        &state.config.stats_base_url,
        method,
        path_and_query,
        headers,
        body,
    )
    .await
}

/// `GET /{code}` — everything that isn't `/health*` or `/api/v1/*` is a
/// lookup redirect candidate.
pub async fn lookup_proxy(
    State(state): State<Arc<AppState>>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path_and_query = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");
    forward(
        &state.client,
        &state.config.lookup_base_url,
        method,
        path_and_query,
        headers,
        body,
    )
    .await
}
