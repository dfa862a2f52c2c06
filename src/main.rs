//! Demo server for the cache headers middleware.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request ──▶ TraceLayer ──▶ cache headers ──▶ TimeoutLayer ──▶ handler
//!                                           │
//!     Client Response ◀─────────────────────┘ normalize Cache-Control,
//!                                             ETag/Last-Modified, Expires, Pragma
//! ```
//!
//! `GET /echo?cache_control=..&etag=..&last_modified=..&expires=..&pragma=..`
//! sets the given headers so the rewrite can be observed with any HTTP client.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use cache_headers::config::{load_config, validation::validate_config, watcher::ConfigWatcher, AppConfig};
use cache_headers::lifecycle::{signals, Shutdown};
use cache_headers::observability::{logging, metrics};
use cache_headers::HttpServer;

#[derive(Parser)]
#[command(name = "cache-headers")]
#[command(about = "Serve responses through the cache headers middleware", long_about = None)]
struct Cli {
    /// TOML config file; defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,

    /// Reload the cache headers section when the config file changes.
    #[arg(long, requires = "config")]
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
        validate_config(&config).map_err(|errors| {
            errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        })?;
    }

    logging::init_logging(&config.observability)?;

    tracing::info!("cache-headers v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        enabled = config.cache_headers.enabled,
        prefer_etag = config.cache_headers.prefer_etag,
        strip_expires = config.cache_headers.strip_expires,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    // Keep the watcher alive for the lifetime of the server.
    let (_watcher, config_updates) = match (&cli.config, cli.watch) {
        (Some(path), true) => {
            let (watcher, rx) = ConfigWatcher::new(path, config.cache_headers.clone());
            (Some(watcher.run()?), rx)
        }
        _ => (None, mpsc::unbounded_channel().1),
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        shutdown.trigger();
    });

    HttpServer::new(config)
        .run(listener, config_updates, server_shutdown)
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
