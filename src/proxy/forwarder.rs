//! Outbound HTTP client.
//!
//! # Responsibilities
//! - Issue exactly one request per inbound request (no retries)
//! - Never follow redirects; the redirect rewriter handles 3xx itself
//! - Attach a body only for methods other than GET/HEAD, streamed as it
//!   arrives
//!
//! # Design Decisions
//! - One shared `reqwest::Client`; pooling is the client's business
//! - The returned future owns the exchange: dropping it (client went away)
//!   aborts the upstream request

use std::error::Error as _;
use std::time::Duration;

use axum::http::{HeaderMap, Method};
use http_body_util::LengthLimitError;
use reqwest::{redirect, Body, Client};

use crate::config::UpstreamConfig;
use crate::error::{ProxyError, Result};
use crate::proxy::target::Target;

/// Sends requests to resolved targets.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: Client,
}

impl Forwarder {
    /// Build the shared client from upstream settings.
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .redirect(redirect::Policy::none())
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .read_timeout(Duration::from_secs(config.read_timeout_secs))
            .user_agent(config.user_agent.as_str());
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build()?;
        Ok(Self { client })
    }

    /// Forward a request to `target`.
    ///
    /// `headers` must already be filtered; they are sent as given.
    pub async fn forward(
        &self,
        target: &Target,
        method: Method,
        headers: HeaderMap,
        body: Option<Body>,
    ) -> Result<reqwest::Response> {
        let carries_body = carries_body(&method);
        let mut request = self
            .client
            .request(method, target.url().clone())
            .headers(headers);

        if carries_body {
            if let Some(body) = body {
                request = request.body(body);
            }
        }

        request.send().await.map_err(classify)
    }
}

/// Attribute a failed exchange to the inbound body when that is where it
/// broke, otherwise to the upstream.
pub fn classify(err: reqwest::Error) -> ProxyError {
    let mut inbound = None;
    let mut source = err.source();
    while let Some(cause) = source {
        if cause.is::<LengthLimitError>() {
            return ProxyError::PayloadTooLarge;
        }
        if inbound.is_none() {
            if let Some(body_err) = cause.downcast_ref::<axum::Error>() {
                inbound = Some(body_err.to_string());
            }
        }
        source = cause.source();
    }
    match inbound {
        Some(message) => ProxyError::RequestBody(message),
        None => ProxyError::Fetch(err),
    }
}

/// GET and HEAD never carry a body upstream.
pub fn carries_body(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD)
}
