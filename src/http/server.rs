//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the demo handlers
//! - Wire up middleware (tracing, timeout, cache headers)
//! - Apply config updates to the live cache policy
//! - Serve until shutdown is signalled

use std::time::Duration;

use axum::{
    extract::Query,
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::http::middleware::{CacheHeadersState, RouterExt};
use crate::lifecycle::ShutdownSignal;

/// Cache headers the echo handler copies from the query string.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EchoParams {
    pub cache_control: Option<String>,
    pub etag: Option<String>,
    pub last_modified: Option<String>,
    pub expires: Option<String>,
    pub pragma: Option<String>,
}

impl EchoParams {
    fn headers(&self) -> [(HeaderName, Option<&str>); 5] {
        [
            (header::CACHE_CONTROL, self.cache_control.as_deref()),
            (header::ETAG, self.etag.as_deref()),
            (header::LAST_MODIFIED, self.last_modified.as_deref()),
            (header::EXPIRES, self.expires.as_deref()),
            (header::PRAGMA, self.pragma.as_deref()),
        ]
    }
}

/// HTTP server hosting the cache headers middleware.
pub struct HttpServer {
    router: Router,
    cache_headers: CacheHeadersState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        let cache_headers = CacheHeadersState::new(config.cache_headers.clone());
        let router = Self::build_router(&config, cache_headers.clone());

        Self {
            router,
            cache_headers,
        }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// The cache headers layer wraps the timeout so timed-out responses are
    /// normalized as well.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, cache_headers: CacheHeadersState) -> Router {
        Router::new()
            .route("/", get(index_handler))
            .route("/echo", get(echo_handler))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .use_cache_headers_shared(cache_headers)
            .layer(TraceLayer::new_for_http())
    }

    /// The router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Handle to the live cache policy.
    pub fn cache_headers(&self) -> CacheHeadersState {
        self.cache_headers.clone()
    }

    /// Run the server until `shutdown` fires.
    ///
    /// Each config received on `config_updates` replaces the cache policy.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<AppConfig>,
        mut shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let cache_headers = self.cache_headers.clone();
        let updates = tokio::spawn(async move {
            while let Some(new_config) = config_updates.recv().await {
                cache_headers.store(new_config.cache_headers);
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        updates.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn index_handler() -> &'static str {
    "ok"
}

/// Respond with whichever cache headers the query string asks for.
async fn echo_handler(Query(params): Query<EchoParams>) -> Response {
    let mut headers = HeaderMap::new();
    for (name, value) in params.headers() {
        let Some(value) = value else { continue };
        match HeaderValue::from_str(value) {
            Ok(value) => {
                headers.insert(name, value);
            }
            Err(_) => {
                return (
                    StatusCode::BAD_REQUEST,
                    format!("Invalid value for {}", name),
                )
                    .into_response();
            }
        }
    }

    (headers, "echo").into_response()
}
