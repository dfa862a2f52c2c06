//! Response cache header normalization for axum.
//!
//! ```no_run
//! use axum::{routing::get, Router};
//! use cache_headers::{CachePolicy, RouterExt};
//!
//! let app: Router = Router::new()
//!     .route("/", get(|| async { "hello" }))
//!     .use_cache_headers(CachePolicy::default());
//! ```

pub mod config;
pub mod headers;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::AppConfig;
pub use headers::{normalize_headers, normalize_response, CachePolicy, Normalization};
pub use http::{HttpServer, RouterExt};
pub use lifecycle::Shutdown;
