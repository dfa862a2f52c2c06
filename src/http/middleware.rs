//! Cache headers middleware.
//!
//! axum writes the response head only after the handler future resolves, so
//! running the normalizer on the response returned by `next` sees the final
//! headers of every inner handler and layer.

use std::sync::Arc;

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::{from_fn_with_state, Next},
    response::Response,
    Router,
};

use crate::config::CacheHeadersConfig;
use crate::headers::{normalize_headers, CachePolicy};
use crate::observability::metrics;

/// Live normalizer settings shared by every request.
///
/// Cloning is cheap; all clones observe [`CacheHeadersState::store`].
#[derive(Clone)]
pub struct CacheHeadersState {
    config: Arc<ArcSwap<CacheHeadersConfig>>,
}

impl CacheHeadersState {
    pub fn new(config: CacheHeadersConfig) -> Self {
        Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
        }
    }

    /// Snapshot of the current settings.
    pub fn current(&self) -> Arc<CacheHeadersConfig> {
        self.config.load_full()
    }

    /// Replace the settings for all subsequent responses.
    pub fn store(&self, config: CacheHeadersConfig) {
        self.config.store(Arc::new(config));
    }
}

impl From<CachePolicy> for CacheHeadersState {
    fn from(policy: CachePolicy) -> Self {
        Self::new(CacheHeadersConfig {
            enabled: true,
            prefer_etag: policy.prefer_etag,
            strip_expires: policy.strip_expires,
        })
    }
}

/// Normalize cache headers on the way out.
pub async fn cache_headers_middleware(
    State(state): State<CacheHeadersState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();

    let mut response = next.run(request).await;

    let config = state.current();
    if !config.enabled {
        return response;
    }

    let report = normalize_headers(response.headers_mut(), &CachePolicy::from(config.as_ref()));
    metrics::record_normalization(&report);

    if !report.is_noop() {
        tracing::debug!(
            method = %method,
            path = %path,
            cleared_cache_control = report.cleared_cache_control,
            removed_last_modified = report.removed_last_modified,
            default_applied = ?report.default_applied.map(|d| d.as_str()),
            removed_expires = report.removed_expires,
            removed_pragma = report.removed_pragma,
            "Cache headers normalized"
        );
    }

    response
}

/// Registration helpers for [`cache_headers_middleware`].
pub trait RouterExt {
    /// Normalize every response of this router with a fixed policy.
    fn use_cache_headers(self, policy: CachePolicy) -> Self;

    /// Normalize with settings that can be swapped at runtime.
    fn use_cache_headers_shared(self, state: CacheHeadersState) -> Self;
}

impl<S> RouterExt for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn use_cache_headers(self, policy: CachePolicy) -> Self {
        self.use_cache_headers_shared(CacheHeadersState::from(policy))
    }

    fn use_cache_headers_shared(self, state: CacheHeadersState) -> Self {
        self.layer(from_fn_with_state(state, cache_headers_middleware))
    }
}
