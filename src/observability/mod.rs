//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! middleware.rs
//!     → logging.rs (structured log events per rewrite)
//!     → metrics.rs (counters per outcome and removed header)
//! ```

pub mod logging;
pub mod metrics;
