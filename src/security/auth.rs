//! Shared-secret HTTP Basic auth gate.
//!
//! One account, username fixed to `admin`, password equal to the secret the
//! process was started with. The secret is injected at construction; nothing
//! here reads the environment.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::sync::Arc;

use crate::error::ProxyError;

/// Username every credential must carry.
pub const USERNAME: &str = "admin";

/// Result of checking a request's credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    Authorized,
    MissingSecret,
    Unauthorized,
}

/// Check an `Authorization` header value against the secret.
///
/// Comparison runs in constant time over the expected header value.
pub fn check(secret: Option<&str>, authorization: Option<&str>) -> AuthOutcome {
    let secret = match secret {
        Some(s) if !s.is_empty() => s,
        _ => return AuthOutcome::MissingSecret,
    };

    let expected = expected_header(secret);
    match authorization {
        Some(given) if constant_time_eq(given.as_bytes(), expected.as_bytes()) => {
            AuthOutcome::Authorized
        }
        _ => AuthOutcome::Unauthorized,
    }
}

/// The exact `Authorization` value accepted for `secret`.
pub fn expected_header(secret: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{USERNAME}:{secret}")))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Injected auth configuration for the middleware.
#[derive(Debug, Clone)]
pub struct AuthGate {
    secret: Option<Arc<str>>,
    secret_env: String,
    realm: String,
}

impl AuthGate {
    pub fn new(secret: Option<String>, secret_env: impl Into<String>, realm: impl Into<String>) -> Self {
        Self {
            secret: secret.filter(|s| !s.is_empty()).map(Arc::from),
            secret_env: secret_env.into(),
            realm: realm.into(),
        }
    }

    pub fn has_secret(&self) -> bool {
        self.secret.is_some()
    }

    /// Run the check and map failures onto the error surface.
    pub fn authorize(&self, authorization: Option<&str>) -> Result<(), ProxyError> {
        match check(self.secret.as_deref(), authorization) {
            AuthOutcome::Authorized => Ok(()),
            AuthOutcome::MissingSecret => Err(ProxyError::ConfigMissing {
                env_var: self.secret_env.clone(),
            }),
            AuthOutcome::Unauthorized => Err(ProxyError::Unauthorized {
                realm: self.realm.clone(),
            }),
        }
    }
}

/// Middleware gating every route, the landing page included.
pub async fn auth_middleware(
    State(gate): State<Arc<AuthGate>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    match gate.authorize(authorization) {
        Ok(()) => next.run(request).await,
        Err(err) => {
            match &err {
                ProxyError::ConfigMissing { env_var } => {
                    tracing::error!(env_var = %env_var, "Rejecting request: proxy secret not configured");
                }
                _ => {
                    tracing::debug!(path = %request.uri().path(), "Rejecting request: bad credentials");
                }
            }
            err.into_response()
        }
    }
}
