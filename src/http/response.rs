//! Response finishing.
//!
//! # Responsibilities
//! - Assemble the client response from upstream status, headers and body
//! - Stamp no-cache headers on every response
//! - Stamp permissive CORS headers on every response
//!
//! # Design Decisions
//! - Stamped headers overwrite whatever the upstream sent under the same name
//! - Error responses go through the same helpers (see `error.rs`)
//! - `stamp_response` runs as the router's outer layer, so middleware
//!   rejections are covered too

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::Response,
};

/// Cache triplet: `Cache-Control`, `Pragma`, `Expires`.
pub fn apply_cache_headers(headers: &mut HeaderMap) {
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
}

/// Permissive CORS headers.
pub fn apply_cors_headers(headers: &mut HeaderMap) {
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("*"),
    );
}

/// Stamp every response leaving the router, including those produced by
/// middleware (413 from the body limit, 408 from the timeout).
pub async fn stamp_response(mut response: Response) -> Response {
    apply_cache_headers(response.headers_mut());
    apply_cors_headers(response.headers_mut());
    response
}

/// Build the outbound response from (possibly rewritten) parts.
pub fn finish(status: StatusCode, headers: HeaderMap, body: Body) -> Response {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    apply_cache_headers(response.headers_mut());
    apply_cors_headers(response.headers_mut());
    response
}
