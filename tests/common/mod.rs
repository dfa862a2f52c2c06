//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use cache_headers::config::AppConfig;
use cache_headers::http::CacheHeadersState;
use cache_headers::{HttpServer, Shutdown};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A demo server running on an ephemeral local port.
#[allow(dead_code)]
pub struct TestServer {
    pub addr: SocketAddr,
    pub cache_headers: CacheHeadersState,
    pub config_updates: mpsc::UnboundedSender<AppConfig>,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<Result<(), std::io::Error>>,
}

#[allow(dead_code)]
impl TestServer {
    /// GET `/echo` with the given cache headers requested.
    pub async fn echo(&self, query: &[(&str, &str)]) -> reqwest::Response {
        client()
            .get(format!("http://{}/echo", self.addr))
            .query(query)
            .send()
            .await
            .expect("server unreachable")
    }
}

/// Start the demo server with `config`, bound to 127.0.0.1:0.
pub async fn start_server(config: AppConfig) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::new(config);
    let cache_headers = server.cache_headers();
    let (config_updates, rx) = mpsc::unbounded_channel();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    let handle = tokio::spawn(async move { server.run(listener, rx, server_shutdown).await });

    // The listener is already bound, so connections queue until serve starts.
    tokio::time::sleep(Duration::from_millis(50)).await;

    TestServer {
        addr,
        cache_headers,
        config_updates,
        shutdown,
        handle,
    }
}

/// A client that never pools or proxies.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
