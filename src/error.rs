//! Error types for the proxy pipeline.
//!
//! Every stage returns `Result<T, ProxyError>`. The enum doubles as the
//! wire-level error surface: `IntoResponse` maps each variant to the status,
//! body format and headers the caller sees.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::http::response::{apply_cache_headers, apply_cors_headers};

/// Failures surfaced by the proxy pipeline.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// No shared secret configured for the deployment.
    #[error("proxy secret is not configured (set the {env_var} environment variable)")]
    ConfigMissing { env_var: String },

    /// Credentials missing or not matching the configured secret.
    #[error("unauthorized")]
    Unauthorized { realm: String },

    /// The target embedded in the path could not be decoded or parsed.
    #[error("malformed target url: {0}")]
    MalformedTarget(String),

    /// The upstream could not be reached (network, DNS, TLS, timeout).
    #[error("{0}")]
    Fetch(#[from] reqwest::Error),

    /// The inbound body could not be read.
    #[error("failed to read request body: {0}")]
    RequestBody(String),

    /// The inbound body outgrew the configured limit mid-stream.
    #[error("length limit exceeded")]
    PayloadTooLarge,
}

/// Result alias for pipeline stages.
pub type Result<T> = std::result::Result<T, ProxyError>;

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ProxyError {
    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyError::ConfigMissing { .. } => "config_missing",
            ProxyError::Unauthorized { .. } => "unauthorized",
            ProxyError::MalformedTarget(_) => "malformed_target",
            ProxyError::Fetch(_) => "fetch_error",
            ProxyError::RequestBody(_) => "request_body",
            ProxyError::PayloadTooLarge => "payload_too_large",
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let mut response = match &self {
            ProxyError::ConfigMissing { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                self.to_string(),
            )
                .into_response(),
            ProxyError::Unauthorized { realm } => {
                let mut response = (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
                let challenge = format!("Basic realm=\"{realm}\"");
                let value = HeaderValue::from_str(&challenge)
                    .unwrap_or_else(|_| HeaderValue::from_static("Basic realm=\"Protected\""));
                response.headers_mut().insert(header::WWW_AUTHENTICATE, value);
                response
            }
            ProxyError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                self.to_string(),
            )
                .into_response(),
            ProxyError::MalformedTarget(_) | ProxyError::Fetch(_) | ProxyError::RequestBody(_) => {
                let mut response = (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody {
                        error: self.to_string(),
                    }),
                )
                    .into_response();
                response.headers_mut().insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json; charset=utf-8"),
                );
                response
            }
        };

        // Uniform across every error path, 401 and config errors included.
        apply_cache_headers(response.headers_mut());
        apply_cors_headers(response.headers_mut());
        response
    }
}
