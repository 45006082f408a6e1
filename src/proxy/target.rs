//! Target resolution: from inbound path to upstream URL.
//!
//! ```text
//! /https%3A%2F%2Fexample.com%2Fa  ?q=1
//!   → strip leading "/"
//!   → percent-decode            https://example.com/a
//!   → default scheme if absent
//!   → reattach query verbatim   https://example.com/a?q=1
//!   → parse as absolute URL
//! ```

use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::error::{ProxyError, Result};
use crate::proxy::encoding::decode_component;

/// Scheme of the request as the caller sees the proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Scheme {
    #[default]
    Http,
    Https,
}

impl Scheme {
    /// Scheme with trailing colon, e.g. `https:`.
    pub fn protocol(self) -> &'static str {
        match self {
            Scheme::Http => "http:",
            Scheme::Https => "https:",
        }
    }
}

impl FromStr for Scheme {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, ()> {
        match s.trim().trim_end_matches(':').to_ascii_lowercase().as_str() {
            "http" => Ok(Scheme::Http),
            "https" => Ok(Scheme::Https),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.protocol().trim_end_matches(':'))
    }
}

/// A resolved upstream URL. Always absolute, always carries a scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    url: Url,
}

impl Target {
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    /// `scheme://host[:port]` of the target.
    pub fn origin(&self) -> String {
        self.url.origin().ascii_serialization()
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

/// Resolve the target embedded in `path`.
///
/// `query` is the inbound query string without its `?`; it is appended
/// unchanged. `scheme` fills in for targets written without one.
pub fn resolve(path: &str, query: Option<&str>, scheme: Scheme) -> Result<Target> {
    let encoded = path.strip_prefix('/').unwrap_or(path);
    let decoded =
        decode_component(encoded).map_err(|e| ProxyError::MalformedTarget(e.to_string()))?;

    let mut raw = if decoded.starts_with("http://") || decoded.starts_with("https://") {
        decoded
    } else {
        format!("{}//{}", scheme.protocol(), decoded)
    };

    if let Some(query) = query.filter(|q| !q.is_empty()) {
        raw.push('?');
        raw.push_str(query);
    }

    let url = Url::parse(&raw).map_err(|e| ProxyError::MalformedTarget(format!("{e}: {raw}")))?;
    Ok(Target { url })
}
