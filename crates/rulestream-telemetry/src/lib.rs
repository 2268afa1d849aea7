//! RuleStream Telemetry
//!
//! Lock-free counters describing classification traffic: sessions opened
//! and rejected, messages classified, and rule evaluations that failed.

pub mod metrics;

pub use metrics::{MetricsCollector, MetricsSnapshot};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::metrics::{MetricsCollector, MetricsSnapshot};
}
