//! Pipeline metrics and their export.
//!
//! Counters are updated by workers and the ordered sink with relaxed
//! atomics; [`Metrics::snapshot`] gives a point-in-time copy.

pub mod export;
pub mod metrics;

pub use export::{JsonExporter, MetricsExporter};
pub use metrics::{Metrics, MetricsSnapshot};
