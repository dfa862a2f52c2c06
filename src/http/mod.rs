//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, tracing and timeout layers)
//!     → handler sets its headers
//!     → middleware.rs (normalize cache headers)
//!     → Send to client
//! ```

pub mod middleware;
pub mod server;

pub use middleware::{cache_headers_middleware, CacheHeadersState, RouterExt};
pub use server::HttpServer;
