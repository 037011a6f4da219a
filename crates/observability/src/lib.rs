//! Observability infrastructure for volscan
//!
//! - Structured logging via tracing
//! - Prometheus metrics for the scan pipeline
//!
//! ```ignore
//! use observability::{init_logging, LogFormat};
//!
//! init_logging("volscan", LogFormat::Pretty)?;
//! observability::init_metrics(9090)?;
//! ```

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, LogFormat};
pub use metrics::{init_metrics, ScanMetrics, ScanOutcome};
