//! Prometheus metrics and structured logging for algodash.
//!
//! - Structured logging with tracing (JSON in production, pretty otherwise)
//! - Prometheus counters for socket lifecycle, push decoding and control calls

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::init_logging;
pub use metrics::Metrics;
