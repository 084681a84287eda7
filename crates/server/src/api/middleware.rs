//! Operator key and metrics middleware for API routes.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;

use crate::metrics::{
    normalize_path, AUTH_FAILURES_TOTAL, HTTP_REQUESTS_IN_FLIGHT, HTTP_REQUESTS_TOTAL,
    HTTP_REQUEST_DURATION,
};
use crate::state::AppState;

/// Metrics middleware that tracks HTTP request duration and counts.
///
/// This middleware records:
/// - Request duration (histogram)
/// - Request count (counter)
/// - Requests in flight (gauge)
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = normalize_path(request.uri().path());

    HTTP_REQUESTS_IN_FLIGHT.inc();

    let response = next.run(request).await;

    HTTP_REQUESTS_IN_FLIGHT.dec();

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    HTTP_REQUEST_DURATION
        .with_label_values(&[&method, &path, &status])
        .observe(duration);
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &path, &status])
        .inc();

    response
}

/// Operator key check for the station API.
///
/// Open when no `server.api_key` is configured. Otherwise the key must come
/// as `Authorization: Bearer <key>` or `X-API-Key: <key>`.
pub async fn api_key_middleware(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(expected) = state
        .config()
        .server
        .api_key
        .as_deref()
        .filter(|k| !k.is_empty())
    else {
        return Ok(next.run(request).await);
    };

    let failure = match extract_key(request.headers()) {
        Some(provided) if constant_time_eq(provided.as_bytes(), expected.as_bytes()) => None,
        Some(_) => Some("invalid"),
        None => Some("missing"),
    };

    match failure {
        None => Ok(next.run(request).await),
        Some(reason) => {
            AUTH_FAILURES_TOTAL.with_label_values(&[reason]).inc();
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

fn extract_key(headers: &HeaderMap) -> Option<&str> {
    if let Some(value) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        if let Some(key) = value
            .strip_prefix("Bearer ")
            .or_else(|| value.strip_prefix("bearer "))
        {
            return Some(key);
        }
    }

    headers.get("x-api-key").and_then(|v| v.to_str().ok())
}

/// Constant-time byte comparison to prevent timing attacks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
