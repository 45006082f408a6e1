//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, header stamping, auth,
//!   timeout, body limit; outermost first)
//! - Bind server to listener with graceful shutdown
//! - Dispatch proxied requests to the pipeline
//! - Observability (metrics, request IDs)

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware,
    response::{IntoResponse, Response},
    routing::{any, get},
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{ProxyConfig, RewriteConfig};
use crate::error::ProxyError;
use crate::http::landing::landing_page;
use crate::http::request::{client_origin, request_id, UuidRequestId};
use crate::http::response::stamp_response;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::proxy::ProxyPipeline;
use crate::security::{auth_middleware, AuthGate};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ProxyPipeline>,
    pub rewrite: Arc<RewriteConfig>,
    /// Host used for rewritten URLs when the request names none.
    pub fallback_host: Arc<str>,
}

/// HTTP server for the proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server.
    ///
    /// `secret` is the shared credential read at startup; `None` leaves
    /// the server up but answering every request with a configuration error.
    pub fn new(config: ProxyConfig, secret: Option<String>) -> Result<Self, ProxyError> {
        let pipeline = ProxyPipeline::new(&config)?;
        Ok(Self::with_pipeline(config, secret, pipeline))
    }

    /// Create a server around a prepared pipeline.
    pub fn with_pipeline(config: ProxyConfig, secret: Option<String>, pipeline: ProxyPipeline) -> Self {
        let gate = Arc::new(AuthGate::new(
            secret,
            config.auth.secret_env.clone(),
            config.auth.realm.clone(),
        ));
        if !gate.has_secret() {
            tracing::error!(
                env_var = %config.auth.secret_env,
                "No proxy secret configured; every request will be refused"
            );
        }

        let state = AppState {
            pipeline: Arc::new(pipeline),
            rewrite: Arc::new(config.rewrite.clone()),
            fallback_host: Arc::from(config.listener.bind_address.as_str()),
        };

        let router = Self::build_router(&config, state, gate);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, state: AppState, gate: Arc<AuthGate>) -> Router {
        Router::new()
            .route("/", get(landing_page))
            .route("/{*target}", any(proxy_handler))
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            // Credentials are checked before the body limit or the clock apply.
            .layer(middleware::from_fn_with_state(gate, auth_middleware))
            .layer(middleware::map_response(stamp_response))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// The router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(Shutdown::signal(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// Main proxy handler: resolve the embedded target and forward.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(request.headers()).to_string();
    let method = request.method().to_string();
    let origin = client_origin(
        request.headers(),
        request.uri(),
        &state.rewrite,
        &state.fallback_host,
    );

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %request.uri().path(),
        "Proxying request"
    );

    match state.pipeline.handle(request, &origin).await {
        Ok((response, outcome)) => {
            tracing::info!(
                request_id = %request_id,
                status = response.status().as_u16(),
                outcome = outcome.as_str(),
                elapsed_ms = start_time.elapsed().as_millis() as u64,
                "Request proxied"
            );
            metrics::record_request(&method, response.status().as_u16(), outcome.as_str(), start_time);
            response
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, kind = e.kind(), error = %e, "Proxy error");
            let response = e.into_response();
            metrics::record_request(&method, response.status().as_u16(), "error", start_time);
            response
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, StatusCode};
    use tower::ServiceExt;

    use crate::security::auth::expected_header;

    fn server(secret: Option<&str>) -> HttpServer {
        HttpServer::new(ProxyConfig::default(), secret.map(str::to_owned)).unwrap()
    }

    fn small_body_server(secret: Option<&str>) -> HttpServer {
        let mut config = ProxyConfig::default();
        config.security.max_body_size = 16;
        HttpServer::new(config, secret.map(str::to_owned)).unwrap()
    }

    fn oversized_post(auth: Option<String>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/https%3A%2F%2Fexample.com%2Fupload")
            .header(header::CONTENT_LENGTH, "64");
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        builder.body(Body::from(vec![b'x'; 64])).unwrap()
    }

    fn get(uri: &str, auth: Option<String>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn missing_secret_refuses_root() {
        let response = server(None).router().oneshot(get("/", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/plain"));
    }

    #[tokio::test]
    async fn bad_credentials_get_challenge() {
        let response = server(Some("pw"))
            .router()
            .oneshot(get("/https%3A%2F%2Fexample.com%2F", Some(expected_header("nope"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers()[header::WWW_AUTHENTICATE],
            "Basic realm=\"Protected\""
        );
    }

    #[tokio::test]
    async fn landing_page_behind_auth() {
        let response = server(Some("pw"))
            .router()
            .oneshot(get("/", Some(expected_header("pw"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html"));
        assert!(response.headers().contains_key("x-request-id"));
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[test]
    fn keeps_its_config() {
        let server = small_body_server(Some("pw"));
        assert_eq!(server.config().security.max_body_size, 16);
    }

    #[tokio::test]
    async fn oversized_body_without_secret_is_config_error() {
        let response = small_body_server(None)
            .router()
            .oneshot(oversized_post(None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/plain"));
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
    }

    #[tokio::test]
    async fn oversized_body_without_credentials_gets_challenge() {
        let response = small_body_server(Some("pw"))
            .router()
            .oneshot(oversized_post(None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers()[header::WWW_AUTHENTICATE],
            "Basic realm=\"Protected\""
        );
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
    }

    #[tokio::test]
    async fn oversized_body_with_credentials_is_413() {
        let response = small_body_server(Some("pw"))
            .router()
            .oneshot(oversized_post(Some(expected_header("pw"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
        assert_eq!(response.headers()[header::PRAGMA], "no-cache");
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn malformed_target_is_json_error() {
        let response = server(Some("pw"))
            .router()
            .oneshot(get("/https%3A%2F%2Fex%ZZ", Some(expected_header("pw"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json; charset=utf-8"
        );
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json["error"].as_str().unwrap().contains("malformed target"));
    }
}
