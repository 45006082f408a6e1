//! `Location` rewriting for 3xx responses.
//!
//! A redirect to `https://a.b/c` becomes `/https%3A%2F%2Fa.b%2Fc`, a path on
//! the proxy itself, so the browser's next hop comes back through us.

use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use url::Url;

use crate::proxy::encoding::encode_component;
use crate::proxy::target::Target;

/// Whether `status` triggers redirect rewriting.
pub fn is_redirect(status: StatusCode) -> bool {
    matches!(status.as_u16(), 301 | 302 | 303 | 307 | 308)
}

/// Map a `Location` value onto a proxy-relative path.
///
/// Absolute locations are normalized and encoded. A relative location is
/// joined onto `target` first when `resolve_relative` is set; otherwise, or
/// if joining fails, the raw value is encoded as-is.
pub fn rewrite_location(location: &str, target: &Target, resolve_relative: bool) -> String {
    let absolute = match Url::parse(location) {
        Ok(url) => Some(url),
        Err(_) if resolve_relative => target.url().join(location).ok(),
        Err(_) => None,
    };

    match absolute {
        Some(url) => format!("/{}", encode_component(url.as_str())),
        None => format!("/{}", encode_component(location)),
    }
}

/// Rewrite the `Location` header of a redirect response.
///
/// Headers without a usable `Location` come back unchanged.
pub fn rewrite_redirect(mut headers: HeaderMap, target: &Target, resolve_relative: bool) -> HeaderMap {
    let Some(location) = headers.get(header::LOCATION).and_then(|v| v.to_str().ok()) else {
        return headers;
    };

    let rewritten = rewrite_location(location, target, resolve_relative);
    tracing::debug!(from = %location, to = %rewritten, "Rewriting redirect location");

    match HeaderValue::from_str(&rewritten) {
        Ok(value) => {
            headers.insert(header::LOCATION, value);
        }
        Err(e) => {
            tracing::warn!(error = %e, "Rewritten location is not a valid header value; leaving it as sent");
        }
    }
    headers
}
