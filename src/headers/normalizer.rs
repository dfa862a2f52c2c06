//! Response cache header normalization.
//!
//! Applied once per response, after every handler has set its headers and
//! before the head is written:
//!
//! 1. `Cache-Control` with both `no-cache` and `no-store` is cleared.
//! 2. With both `ETag` and `Last-Modified`, `Last-Modified` is dropped.
//! 3. An unset `Cache-Control` becomes `no-cache` when a validator is present,
//!    `no-store` otherwise.
//! 4. `Pragma` and `Expires` are removed.
//!
//! The pass is idempotent: running it over its own output changes nothing.

use axum::http::{header, HeaderMap, HeaderValue, Response};
use thiserror::Error;

use crate::config::CacheHeadersConfig;
use crate::headers::cache_control::CacheControl;

/// Errors raised by [`normalize_response`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    /// The hook fired without a response to operate on.
    #[error("no response available to normalize")]
    MissingResponse,
}

/// Rule switches for the normalizer.
///
/// The default applies every rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// Drop `Last-Modified` when an `ETag` is also present.
    pub prefer_etag: bool,
    /// Remove `Expires` along with `Pragma`.
    pub strip_expires: bool,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            prefer_etag: true,
            strip_expires: true,
        }
    }
}

impl From<&CacheHeadersConfig> for CachePolicy {
    fn from(config: &CacheHeadersConfig) -> Self {
        Self {
            prefer_etag: config.prefer_etag,
            strip_expires: config.strip_expires,
        }
    }
}

/// `Cache-Control` value filled in when a response has none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultDirective {
    /// A validator exists; clients must revalidate.
    NoCache,
    /// No validator; never cache.
    NoStore,
}

impl DefaultDirective {
    pub fn as_str(&self) -> &'static str {
        match self {
            DefaultDirective::NoCache => "no-cache",
            DefaultDirective::NoStore => "no-store",
        }
    }

    fn header_value(&self) -> HeaderValue {
        HeaderValue::from_static(self.as_str())
    }
}

/// What a single normalization pass changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Normalization {
    /// An existing `Cache-Control` was dropped (contradictory or empty).
    pub cleared_cache_control: bool,
    pub removed_last_modified: bool,
    /// Set when `Cache-Control` was filled in.
    pub default_applied: Option<DefaultDirective>,
    pub removed_expires: bool,
    pub removed_pragma: bool,
}

impl Normalization {
    /// True when the headers were left untouched.
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}

/// Rewrite the cache headers in place according to `policy`.
pub fn normalize_headers(headers: &mut HeaderMap, policy: &CachePolicy) -> Normalization {
    let mut report = Normalization::default();

    if headers.contains_key(header::CACHE_CONTROL) {
        let cache_control = CacheControl::from_headers(headers);
        if cache_control.is_contradictory() || cache_control.is_empty() {
            headers.remove(header::CACHE_CONTROL);
            report.cleared_cache_control = true;
        }
    }

    if policy.prefer_etag
        && headers.contains_key(header::ETAG)
        && headers.remove(header::LAST_MODIFIED).is_some()
    {
        report.removed_last_modified = true;
    }

    if !headers.contains_key(header::CACHE_CONTROL) {
        let has_validator =
            headers.contains_key(header::ETAG) || headers.contains_key(header::LAST_MODIFIED);
        let directive = if has_validator {
            DefaultDirective::NoCache
        } else {
            DefaultDirective::NoStore
        };
        headers.insert(header::CACHE_CONTROL, directive.header_value());
        report.default_applied = Some(directive);
    }

    if policy.strip_expires {
        report.removed_expires = headers.remove(header::EXPIRES).is_some();
    }
    report.removed_pragma = headers.remove(header::PRAGMA).is_some();

    report
}

/// Normalize a response handed over by a "headers about to be sent" hook.
///
/// Fails only when the hook has no response.
pub fn normalize_response<B>(
    response: Option<&mut Response<B>>,
    policy: &CachePolicy,
) -> Result<Normalization, NormalizeError> {
    let response = response.ok_or(NormalizeError::MissingResponse)?;
    Ok(normalize_headers(response.headers_mut(), policy))
}
