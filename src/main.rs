//! LibCal availability proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!   Browser                  ┌──────────────────────────────────────────────┐
//!   ───────────────────────▶ │  http::server (request id, trace, CORS)       │
//!   GET|POST /api/post       │      │                                        │
//!   GET /api/rooms...        │      ├─▶ http::rooms ──▶ catalog (rooms.json) │
//!                            │      │                                        │
//!                            │      └─▶ http::availability                   │
//!                            │              │                                │
//!                            │              ▼                                │
//!                            │         libcal::client ── form POST ─────────┼──▶ LibCal grid
//!                            │              ◀── br/gzip/deflate JSON ────────┼───
//!   ◀─────────────────────── │         { success, data, debug }              │
//!                            └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use availability_proxy::config::{load_config, ConfigWatcher, ProxyConfig};
use availability_proxy::observability::{logging, metrics};
use availability_proxy::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "availability-proxy")]
#[command(about = "Relays room availability queries to LibCal", long_about = None)]
struct Args {
    /// TOML config file; built-in defaults are used without one.
    #[arg(short, long, env = "AVAILABILITY_PROXY_CONFIG")]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "availability-proxy starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        endpoint = %config.upstream.endpoint,
        timezone = %config.upstream.timezone,
        request_timeout_secs = config.timeouts.request_secs,
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

    // The watcher handle must outlive the server.
    let (_watcher, config_updates) = match &args.config {
        Some(path) => {
            let (mut watcher, rx) = ConfigWatcher::new(path);
            if let Some(catalog) = &config.catalog.path {
                watcher = watcher.also_watch(catalog);
            }
            (Some(watcher.run()?), rx)
        }
        None => {
            let (_tx, rx) = mpsc::unbounded_channel();
            (None, rx)
        }
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    server.run(listener, config_updates, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
