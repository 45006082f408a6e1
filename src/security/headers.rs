//! Header filtering on the way to and from the upstream.
//!
//! # Responsibilities
//! - Strip headers injected by the hosting edge (reserved prefixes)
//! - Strip hop-by-hop and transport headers the client library manages
//! - Keep the proxy's own credential away from the target
//!
//! # Design Decisions
//! - Filters are pure: they return a new map and never mutate the input
//! - Order and multiplicity of surviving entries are preserved

use axum::http::{header, HeaderMap, HeaderName};

/// Headers that describe a single connection rather than the message.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Removes header names with a reserved prefix.
#[derive(Debug, Clone)]
pub struct HeaderFilter {
    prefixes: Vec<String>,
}

impl HeaderFilter {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            prefixes: prefixes
                .into_iter()
                .map(|p| p.as_ref().trim().to_ascii_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    /// Whether `name` falls under a reserved prefix.
    pub fn is_reserved(&self, name: &HeaderName) -> bool {
        // HeaderName is always stored lowercase.
        let name = name.as_str();
        self.prefixes.iter().any(|p| name.starts_with(p.as_str()))
    }

    /// Copy of `headers` without reserved entries.
    pub fn filter(&self, headers: &HeaderMap) -> HeaderMap {
        retain(headers, |name| !self.is_reserved(name))
    }
}

impl Default for HeaderFilter {
    fn default() -> Self {
        Self::new(["cf-"])
    }
}

/// Prepare filtered inbound headers for the outbound client.
///
/// `host` is recomputed by the client for the new target. `content-length`
/// is restored by the pipeline only when a body is relayed. `accept-encoding`
/// is left to the client so it can decompress bodies that need rewriting,
/// and `authorization` belongs to the proxy.
pub fn outbound_request_headers(filtered: &HeaderMap) -> HeaderMap {
    retain(filtered, |name| {
        !is_hop_by_hop(name)
            && *name != header::HOST
            && *name != header::CONTENT_LENGTH
            && *name != header::ACCEPT_ENCODING
            && *name != header::AUTHORIZATION
    })
}

/// Upstream response headers that may be copied to the client.
pub fn client_response_headers(upstream: &HeaderMap) -> HeaderMap {
    retain(upstream, |name| !is_hop_by_hop(name))
}

fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(&name.as_str())
}

fn retain(headers: &HeaderMap, keep: impl Fn(&HeaderName) -> bool) -> HeaderMap {
    let mut out = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if keep(name) {
            out.append(name.clone(), value.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn sample() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.append("accept", HeaderValue::from_static("text/html"));
        headers.append(
            HeaderName::from_bytes(b"CF-Connecting-IP").unwrap(),
            HeaderValue::from_static("1.2.3.4"),
        );
        headers.append("x-custom", HeaderValue::from_static("a"));
        headers.append("cf-ray", HeaderValue::from_static("abc"));
        headers.append("x-custom", HeaderValue::from_static("b"));
        headers.append("cfx-not-reserved", HeaderValue::from_static("kept"));
        headers
    }

    #[test]
    fn strips_reserved_prefix_case_insensitively() {
        let filtered = HeaderFilter::default().filter(&sample());
        assert!(filtered.keys().all(|k| !k.as_str().starts_with("cf-")));
        assert_eq!(filtered.len(), 4);
        assert_eq!(filtered["cfx-not-reserved"], "kept");
    }

    #[test]
    fn preserves_multiplicity_and_order() {
        let filtered = HeaderFilter::default().filter(&sample());
        let values: Vec<_> = filtered.get_all("x-custom").iter().collect();
        assert_eq!(values, vec!["a", "b"]);
    }

    #[test]
    fn filter_is_idempotent() {
        let filter = HeaderFilter::new(["cf-", "X-Edge-"]);
        let mut headers = sample();
        headers.append("x-edge-trace", HeaderValue::from_static("1"));
        let once = filter.filter(&headers);
        let twice = filter.filter(&once);
        assert_eq!(once, twice);
        assert!(!once.contains_key("x-edge-trace"));
    }

    #[test]
    fn outbound_drops_transport_and_credentials() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("proxy.local"));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic xyz"));
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("3"));
        headers.insert(header::ACCEPT_ENCODING, HeaderValue::from_static("gzip"));
        headers.insert(header::USER_AGENT, HeaderValue::from_static("curl/8"));

        let out = outbound_request_headers(&headers);
        assert_eq!(out.len(), 1);
        assert_eq!(out[header::USER_AGENT], "curl/8");
    }

    #[test]
    fn response_keeps_end_to_end_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        headers.append(header::SET_COOKIE, HeaderValue::from_static("a=1"));
        headers.append(header::SET_COOKIE, HeaderValue::from_static("b=2"));

        let out = client_response_headers(&headers);
        assert!(!out.contains_key(header::TRANSFER_ENCODING));
        assert_eq!(out.get_all(header::SET_COOKIE).iter().count(), 2);
    }
}
