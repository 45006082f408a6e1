//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Credential settings for the auth gate.
    pub auth: AuthConfig,

    /// Outbound client settings.
    pub upstream: UpstreamConfig,

    /// Request and response rewriting behavior.
    pub rewrite: RewriteConfig,

    /// Inbound timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request size limits.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Auth gate configuration.
///
/// The secret itself never lives in the config file; only the name of the
/// environment variable it is read from.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Environment variable holding the shared secret.
    pub secret_env: String,

    /// Realm advertised in the `WWW-Authenticate` challenge.
    pub realm: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_env: "PROXY_PASSWORD".to_string(),
            realm: "Protected".to_string(),
        }
    }
}

/// Outbound client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Longest silence allowed between reads from the upstream, in seconds.
    ///
    /// Idle time, not a cap on the whole exchange: a long download keeps
    /// going as long as bytes keep arriving.
    pub read_timeout_secs: u64,

    /// User-Agent sent when the caller did not provide one.
    pub user_agent: String,

    /// Route upstream requests through `HTTP_PROXY`/`HTTPS_PROXY` if set.
    pub use_system_proxy: bool,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            read_timeout_secs: 60,
            user_agent: concat!("path-proxy/", env!("CARGO_PKG_VERSION")).to_string(),
            use_system_proxy: true,
        }
    }
}

/// Rewriting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RewriteConfig {
    /// Header name prefixes injected by the hosting edge, stripped before forwarding.
    pub reserved_header_prefixes: Vec<String>,

    /// Rewrite root-relative `href`/`src`/`action` references in HTML bodies.
    pub rewrite_html: bool,

    /// Resolve a relative `Location` against the target before encoding it.
    pub resolve_relative_redirects: bool,

    /// Scheme assumed for the proxy itself ("http" or "https").
    pub default_scheme: String,

    /// Take the proxy's scheme from `X-Forwarded-Proto` when present.
    pub trust_forwarded_proto: bool,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            reserved_header_prefixes: vec!["cf-".to_string()],
            rewrite_html: true,
            resolve_relative_redirects: true,
            default_scheme: "http".to_string(),
            trust_forwarded_proto: true,
        }
    }
}

/// Inbound timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 90 }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum inbound body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 10 * 1024 * 1024, // 10MB
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log line format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
