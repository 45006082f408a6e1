//! Path-addressed forwarding proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request  GET /https%3A%2F%2Fexample.com%2F
//!     ─────────────────────────────┐
//!                                  ▼
//!     ┌──────────┐   ┌──────────────┐   ┌─────────────┐   ┌───────────┐
//!     │   auth   │──▶│    target    │──▶│   header    │──▶│ forwarder │──▶ Upstream
//!     │   gate   │   │   resolver   │   │   filter    │   │ (reqwest) │
//!     └──────────┘   └──────────────┘   └─────────────┘   └─────┬─────┘
//!                                                               │
//!     ┌──────────┐   ┌──────────────────────────────────┐       │
//!     │ finisher │◀──│ redirect rewriter | html rewriter │◀──────┘
//!     │no-cache, │   │          | passthrough           │
//!     │   CORS   │   └──────────────────────────────────┘
//!     └────┬─────┘
//!          ▼
//!     Client Response
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use path_proxy::config::{load_config, read_secret, ProxyConfig};
use path_proxy::lifecycle::{signals, Shutdown};
use path_proxy::observability::{logging, metrics};
use path_proxy::HttpServer;

#[derive(Parser)]
#[command(name = "path-proxy")]
#[command(about = "Forward /<target-url> requests with redirect and HTML path rewriting", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability)?;

    tracing::info!("path-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        upstream_read_timeout_secs = config.upstream.read_timeout_secs,
        reserved_header_prefixes = ?config.rewrite.reserved_header_prefixes,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let secret = read_secret(&config);
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, secret)?;
    let server_shutdown = shutdown.subscribe();

    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        signals::wait_for_termination().await;
        signal_shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
