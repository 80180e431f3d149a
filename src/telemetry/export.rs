//! Metrics export functionality.

use super::metrics::MetricsSnapshot;
use crate::error::{Error, Result};
use serde::Serialize;
use std::path::PathBuf;

/// Trait for exporting metrics to different formats
pub trait MetricsExporter: Send + Sync {
    fn export(&self, snapshot: &MetricsSnapshot) -> Result<()>;
}

/// Export metrics to a JSON file
#[derive(Debug)]
pub struct JsonExporter {
    output_path: PathBuf,
}

impl JsonExporter {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
        }
    }
}

impl MetricsExporter for JsonExporter {
    fn export(&self, snapshot: &MetricsSnapshot) -> Result<()> {
        let json = snapshot.to_json()?;

        std::fs::write(&self.output_path, json)
            .map_err(|e| Error::export(format!("failed to write {}: {}", self.output_path.display(), e)))?;

        Ok(())
    }
}

impl MetricsSnapshot {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&SerializableSnapshot::from(self))
            .map_err(|e| Error::export(format!("JSON serialization failed: {}", e)))
    }
}

#[derive(Debug, Clone, Serialize)]
struct SerializableSnapshot {
    uptime_secs: f64,
    tasks_submitted: u64,
    tasks_completed: u64,
    tasks_failed: u64,
    tasks_panicked: u64,
    results_emitted: u64,
    results_skipped: u64,
    max_reorder_depth: usize,
    avg_latency_us: f64,
    p50_latency_us: f64,
    p99_latency_us: f64,
    max_latency_us: f64,
    tasks_per_second: f64,
}

impl From<&MetricsSnapshot> for SerializableSnapshot {
    fn from(snapshot: &MetricsSnapshot) -> Self {
        Self {
            uptime_secs: snapshot.uptime.as_secs_f64(),
            tasks_submitted: snapshot.tasks_submitted,
            tasks_completed: snapshot.tasks_completed,
            tasks_failed: snapshot.tasks_failed,
            tasks_panicked: snapshot.tasks_panicked,
            results_emitted: snapshot.results_emitted,
            results_skipped: snapshot.results_skipped,
            max_reorder_depth: snapshot.max_reorder_depth,
            avg_latency_us: snapshot.avg_latency_ns as f64 / 1_000.0,
            p50_latency_us: snapshot.p50_latency_ns as f64 / 1_000.0,
            p99_latency_us: snapshot.p99_latency_ns as f64 / 1_000.0,
            max_latency_us: snapshot.max_latency_ns as f64 / 1_000.0,
            tasks_per_second: snapshot.tasks_per_second(),
        }
    }
}
