//! Request-side helpers.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) for every inbound request
//! - Work out how the client addressed the proxy (scheme and host), which
//!   HTML rewriting needs to build absolute proxy URLs

use axum::http::{header, HeaderMap, HeaderValue, Request, Uri};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::config::RewriteConfig;
use crate::proxy::pipeline::ClientOrigin;
use crate::proxy::target::Scheme;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Header set by TLS-terminating edges.
pub const X_FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Request ID generator for `SetRequestIdLayer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Request ID of an inbound request, or `"unknown"`.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// How the client reached the proxy.
///
/// Scheme: `X-Forwarded-Proto` when trusted, then the request URI, then the
/// configured default. Host: the `Host` header, then the URI authority, then
/// `fallback_host`.
pub fn client_origin(
    headers: &HeaderMap,
    uri: &Uri,
    rewrite: &RewriteConfig,
    fallback_host: &str,
) -> ClientOrigin {
    let forwarded = rewrite
        .trust_forwarded_proto
        .then(|| headers.get(X_FORWARDED_PROTO))
        .flatten()
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|v| v.parse::<Scheme>().ok());

    let scheme = forwarded
        .or_else(|| uri.scheme_str().and_then(|s| s.parse().ok()))
        .or_else(|| rewrite.default_scheme.parse().ok())
        .unwrap_or_default();

    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .or_else(|| uri.authority().map(|a| a.to_string()))
        .unwrap_or_else(|| fallback_host.to_owned());

    ClientOrigin { scheme, host }
}
