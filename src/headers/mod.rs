//! Cache header subsystem.
//!
//! # Data Flow
//! ```text
//! Handler sets headers
//!     → cache_control.rs (parse Cache-Control directives)
//!     → normalizer.rs (apply the rewrite rules, produce a report)
//!     → Response written to client
//! ```

pub mod cache_control;
pub mod normalizer;

pub use cache_control::{CacheControl, Directive};
pub use normalizer::{
    normalize_headers, normalize_response, CachePolicy, DefaultDirective, Normalization,
    NormalizeError,
};
