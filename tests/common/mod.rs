//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::{to_bytes, Body, Bytes},
    extract::State,
    http::{HeaderMap, Method, Request},
    response::Response,
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;

use path_proxy::lifecycle::Shutdown;
use path_proxy::proxy::ProxyPipeline;
use path_proxy::{HttpServer, ProxyConfig};

pub const SECRET: &str = "correct horse battery staple";

/// A request as the mock backend received it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path_and_query: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

type Responder = Arc<dyn Fn(&Recorded) -> Response + Send + Sync>;

#[derive(Clone)]
struct BackendState {
    responder: Responder,
    log: Arc<Mutex<Vec<Recorded>>>,
}

/// A programmable upstream that records every request it sees.
pub struct MockBackend {
    pub addr: SocketAddr,
    log: Arc<Mutex<Vec<Recorded>>>,
}

impl MockBackend {
    pub async fn start<F>(respond: F) -> Self
    where
        F: Fn(&Recorded) -> Response + Send + Sync + 'static,
    {
        let log = Arc::new(Mutex::new(Vec::new()));
        Self::serve(recording_app(respond, log.clone()), log).await
    }

    /// Like `start`, but gzip-compresses responses the client accepts gzip for.
    pub async fn start_gzip<F>(respond: F) -> Self
    where
        F: Fn(&Recorded) -> Response + Send + Sync + 'static,
    {
        let log = Arc::new(Mutex::new(Vec::new()));
        let app = recording_app(respond, log.clone()).layer(CompressionLayer::new().gzip(true));
        Self::serve(app, log).await
    }

    async fn serve(app: Router, log: Arc<Mutex<Vec<Recorded>>>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, log }
    }

    /// `http://127.0.0.1:<port>`
    pub fn origin(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.log.lock().unwrap().clone()
    }
}

fn recording_app<F>(respond: F, log: Arc<Mutex<Vec<Recorded>>>) -> Router
where
    F: Fn(&Recorded) -> Response + Send + Sync + 'static,
{
    let state = BackendState {
        responder: Arc::new(respond),
        log,
    };
    Router::new().fallback(record_and_respond).with_state(state)
}

async fn record_and_respond(State(state): State<BackendState>, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();
    let recorded = Recorded {
        method: parts.method,
        path_and_query: parts
            .uri
            .path_and_query()
            .map(|pq| pq.to_string())
            .unwrap_or_default(),
        headers: parts.headers,
        body: to_bytes(body, usize::MAX).await.unwrap_or_default(),
    };
    let response = (state.responder)(&recorded);
    state.log.lock().unwrap().push(recorded);
    response
}

/// A running proxy bound to an ephemeral port.
pub struct TestProxy {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl TestProxy {
    pub async fn start(secret: Option<&str>) -> Self {
        Self::start_with(config(), secret).await
    }

    pub async fn start_with(config: ProxyConfig, secret: Option<&str>) -> Self {
        let pipeline = ProxyPipeline::new(&config).unwrap();
        Self::start_with_pipeline(config, secret, pipeline).await
    }

    pub async fn start_with_pipeline(
        mut config: ProxyConfig,
        secret: Option<&str>,
        pipeline: ProxyPipeline,
    ) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        config.listener.bind_address = addr.to_string();

        let shutdown = Shutdown::new();
        let server = HttpServer::with_pipeline(config, secret.map(str::to_owned), pipeline);
        let server_shutdown = shutdown.subscribe();
        tokio::spawn(async move {
            let _ = server.run(listener, server_shutdown).await;
        });

        Self { addr, shutdown }
    }

    /// Proxy URL for an already-encoded target path.
    pub fn url(&self, encoded_target: &str) -> String {
        format!("http://{}/{}", self.addr, encoded_target)
    }
}

impl Drop for TestProxy {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Default config with upstream traffic kept off any system proxy.
pub fn config() -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.upstream.use_system_proxy = false;
    config
}

/// Client that neither follows redirects nor goes through a system proxy.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap()
}

/// `Authorization` value for `admin:<secret>`.
pub fn basic_auth(secret: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("admin:{secret}")))
}

/// Percent-encode a URL the way the landing page does.
pub fn encode(url: &str) -> String {
    path_proxy::proxy::encoding::encode_component(url)
}
