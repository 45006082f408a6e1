//! The forwarding pipeline.
//!
//! ```text
//! Request<Body>
//!   → target::resolve        (path + query → upstream URL)
//!   → HeaderFilter::filter   (drop edge-reserved headers)
//!   → Forwarder::forward     (one attempt, no redirect following)
//!   → redirect | html | passthrough
//!   → response::finish       (no-cache + CORS)
//! ```

use std::sync::Arc;

use axum::{
    body::{Body, HttpBody},
    http::{header, Method, Request, StatusCode},
    response::Response,
};
use futures_util::TryStreamExt;

use crate::config::ProxyConfig;
use crate::error::Result;
use crate::http::response::finish;
use crate::proxy::forwarder::{carries_body, Forwarder};
use crate::proxy::target::{self, Scheme, Target};
use crate::rewrite::{is_html, is_redirect, rewrite_redirect, BodyRewriter, RewriteContext, RootRelativeRewriter};
use crate::security::headers::{client_response_headers, outbound_request_headers, HeaderFilter};

/// Scheme and host under which the client reached the proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOrigin {
    pub scheme: Scheme,
    pub host: String,
}

/// Which transform the upstream response went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Redirect,
    Html,
    Passthrough,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Redirect => "redirect",
            Outcome::Html => "html",
            Outcome::Passthrough => "passthrough",
        }
    }
}

/// Stateless per-request pipeline; shared immutably across requests.
pub struct ProxyPipeline {
    forwarder: Forwarder,
    header_filter: HeaderFilter,
    html_rewriter: Option<Arc<dyn BodyRewriter>>,
    resolve_relative_redirects: bool,
}

impl ProxyPipeline {
    pub fn new(config: &ProxyConfig) -> Result<Self> {
        let html_rewriter: Option<Arc<dyn BodyRewriter>> = if config.rewrite.rewrite_html {
            Some(Arc::new(RootRelativeRewriter))
        } else {
            None
        };

        Ok(Self {
            forwarder: Forwarder::new(&config.upstream)?,
            header_filter: HeaderFilter::new(&config.rewrite.reserved_header_prefixes),
            html_rewriter,
            resolve_relative_redirects: config.rewrite.resolve_relative_redirects,
        })
    }

    /// Swap the HTML body rewriter.
    pub fn with_html_rewriter(mut self, rewriter: Arc<dyn BodyRewriter>) -> Self {
        self.html_rewriter = Some(rewriter);
        self
    }

    /// Forward `request` to the target embedded in its path.
    pub async fn handle(&self, request: Request<Body>, origin: &ClientOrigin) -> Result<(Response, Outcome)> {
        let (parts, body) = request.into_parts();

        let target = target::resolve(parts.uri.path(), parts.uri.query(), origin.scheme)?;
        let mut headers = outbound_request_headers(&self.header_filter.filter(&parts.headers));

        // The inbound body is relayed as it arrives; its size cap is enforced
        // by the limit layer wrapped around it.
        let body = if carries_body(&parts.method) && !body.is_end_stream() {
            if let Some(length) = parts.headers.get(header::CONTENT_LENGTH) {
                headers.insert(header::CONTENT_LENGTH, length.clone());
            }
            Some(reqwest::Body::wrap_stream(body.into_data_stream()))
        } else {
            None
        };

        tracing::debug!(method = %parts.method, target = %target, "Forwarding request");

        let upstream = self
            .forwarder
            .forward(&target, parts.method.clone(), headers, body)
            .await?;

        self.transform(upstream, &parts.method, &target, origin).await
    }

    async fn transform(
        &self,
        upstream: reqwest::Response,
        method: &Method,
        target: &Target,
        origin: &ClientOrigin,
    ) -> Result<(Response, Outcome)> {
        let status: StatusCode = upstream.status();
        let mut headers = client_response_headers(upstream.headers());

        if is_redirect(status) {
            let headers = rewrite_redirect(headers, target, self.resolve_relative_redirects);
            let body = stream_body(upstream, target);
            return Ok((finish(status, headers, body), Outcome::Redirect));
        }

        let html = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(is_html);

        match &self.html_rewriter {
            Some(rewriter) if html && *method != Method::HEAD => {
                let bytes = upstream.bytes().await?;
                let text = String::from_utf8_lossy(&bytes);
                let target_origin = target.origin();
                let ctx = RewriteContext {
                    scheme: origin.scheme,
                    host: &origin.host,
                    target_origin: &target_origin,
                };
                let rewritten = rewriter.rewrite(&text, &ctx);
                // Length changed; let the server recompute it.
                headers.remove(header::CONTENT_LENGTH);
                Ok((finish(status, headers, Body::from(rewritten)), Outcome::Html))
            }
            _ => {
                let body = stream_body(upstream, target);
                Ok((finish(status, headers, body), Outcome::Passthrough))
            }
        }
    }
}

/// Relay the upstream body without buffering it.
fn stream_body(upstream: reqwest::Response, target: &Target) -> Body {
    let target = target.to_string();
    Body::from_stream(upstream.bytes_stream().inspect_err(move |e| {
        tracing::warn!(target = %target, error = %e, "Upstream body interrupted");
    }))
}
