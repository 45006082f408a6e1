//! Path-addressed forwarding proxy library.
//!
//! A request to `/<percent-encoded target URL>` is forwarded to that URL and
//! the response is returned with redirects and root-relative HTML references
//! rewritten to keep routing through the proxy.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod rewrite;
pub mod security;

pub use config::schema::ProxyConfig;
pub use error::ProxyError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
