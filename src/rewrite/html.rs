//! Root-relative reference rewriting in HTML bodies.
//!
//! `<a href="/x">` on a page fetched from `https://site.example` through a
//! proxy at `http://proxy.local` becomes
//! `<a href="http://proxy.local/https://site.example/x">`.
//!
//! Only `href`, `src` and `action` are touched, and only when the value
//! starts with a single `/`. Protocol-relative `//host/...` values, CSS
//! `url(...)`, script literals, `srcset` and meta refresh are left alone.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::proxy::target::Scheme;

static ROOT_RELATIVE_ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?P<attr>href|src|action)=(?P<quote>["'])/(?P<next>[^/]|$)"#)
        .expect("valid root-relative attribute regex")
});

/// Where the rewritten page is being served from.
#[derive(Debug, Clone, Copy)]
pub struct RewriteContext<'a> {
    /// Scheme of the proxy as the client reached it.
    pub scheme: Scheme,
    /// Host (with port) of the proxy as the client reached it.
    pub host: &'a str,
    /// `scheme://host[:port]` of the upstream page.
    pub target_origin: &'a str,
}

/// A transform over a fully buffered response body.
///
/// The regex pass below is the only implementation; a streaming tag
/// rewriter can replace it without touching the pipeline.
pub trait BodyRewriter: Send + Sync {
    fn rewrite(&self, body: &str, ctx: &RewriteContext<'_>) -> String;
}

/// Textual rewriter for root-relative attribute references.
#[derive(Debug, Clone, Copy, Default)]
pub struct RootRelativeRewriter;

impl BodyRewriter for RootRelativeRewriter {
    fn rewrite(&self, body: &str, ctx: &RewriteContext<'_>) -> String {
        rewrite_html(body, ctx.scheme, ctx.host, ctx.target_origin)
    }
}

/// Re-root every root-relative `href`/`src`/`action` through the proxy.
pub fn rewrite_html(body: &str, scheme: Scheme, host: &str, target_origin: &str) -> String {
    let prefix = format!("{}//{}/{}/", scheme.protocol(), host, target_origin);
    ROOT_RELATIVE_ATTR_RE
        .replace_all(body, |caps: &Captures| {
            format!("{}={}{}{}", &caps["attr"], &caps["quote"], prefix, &caps["next"])
        })
        .into_owned()
}

/// Whether a `Content-Type` value selects HTML rewriting.
pub fn is_html(content_type: &str) -> bool {
    content_type.contains("text/html")
}
