//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges and formats.
//! Every error is collected rather than stopping at the first.

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ProxyConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field}: must be greater than zero")]
    Zero { field: &'static str },

    #[error("rewrite.default_scheme: expected \"http\" or \"https\", got {0:?}")]
    InvalidScheme(String),

    #[error("rewrite.reserved_header_prefixes: empty prefix would strip every header")]
    EmptyPrefix,

    #[error("auth.secret_env: must name an environment variable")]
    MissingSecretEnv,
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if config.upstream.connect_timeout_secs == 0 {
        errors.push(ValidationError::Zero {
            field: "upstream.connect_timeout_secs",
        });
    }
    if config.upstream.read_timeout_secs == 0 {
        errors.push(ValidationError::Zero {
            field: "upstream.read_timeout_secs",
        });
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero {
            field: "timeouts.request_secs",
        });
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::Zero {
            field: "security.max_body_size",
        });
    }

    if !matches!(config.rewrite.default_scheme.as_str(), "http" | "https") {
        errors.push(ValidationError::InvalidScheme(
            config.rewrite.default_scheme.clone(),
        ));
    }

    if config
        .rewrite
        .reserved_header_prefixes
        .iter()
        .any(|p| p.trim().is_empty())
    {
        errors.push(ValidationError::EmptyPrefix);
    }

    if config.auth.secret_env.trim().is_empty() {
        errors.push(ValidationError::MissingSecretEnv);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
