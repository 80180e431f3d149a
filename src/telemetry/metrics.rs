//! Metrics collection for pipeline monitoring.

use hdrhistogram::Histogram;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Pipeline metrics collector
#[derive(Debug)]
pub struct Metrics {
    // Task counters
    tasks_submitted: AtomicU64,
    tasks_completed: AtomicU64,
    tasks_failed: AtomicU64,
    tasks_panicked: AtomicU64,

    // Ordered sink counters
    results_emitted: AtomicU64,
    results_skipped: AtomicU64,
    max_reorder_depth: AtomicUsize,

    // Task function latency, None if the histogram could not be created
    latency_histogram: Option<RwLock<Histogram<u64>>>,

    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        // 3 significant figures, max value of 1 hour in nanoseconds
        let histogram = Histogram::new_with_max(3_600_000_000_000, 3)
            .map_err(|e| tracing::warn!(error = %e, "latency histogram disabled"))
            .ok()
            .map(RwLock::new);

        Self {
            tasks_submitted: AtomicU64::new(0),
            tasks_completed: AtomicU64::new(0),
            tasks_failed: AtomicU64::new(0),
            tasks_panicked: AtomicU64::new(0),
            results_emitted: AtomicU64::new(0),
            results_skipped: AtomicU64::new(0),
            max_reorder_depth: AtomicUsize::new(0),
            latency_histogram: histogram,
            start_time: Instant::now(),
        }
    }

    pub fn record_task_submitted(&self) {
        self.tasks_submitted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful task with the task function's run time
    pub fn record_task_completed(&self, duration_ns: u64) {
        self.tasks_completed.fetch_add(1, Ordering::Relaxed);

        if let Some(histogram) = &self.latency_histogram {
            let _ = histogram.write().record(duration_ns);
        }
    }

    pub fn record_task_failed(&self) {
        self.tasks_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_task_panic(&self) {
        self.tasks_panicked.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_result_emitted(&self) {
        self.results_emitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_result_skipped(&self) {
        self.results_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Track the high-water mark of results held in the reorder buffer
    pub fn record_reorder_depth(&self, depth: usize) {
        self.max_reorder_depth.fetch_max(depth, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let mut snapshot = MetricsSnapshot {
            uptime: self.start_time.elapsed(),
            tasks_submitted: self.tasks_submitted.load(Ordering::Relaxed),
            tasks_completed: self.tasks_completed.load(Ordering::Relaxed),
            tasks_failed: self.tasks_failed.load(Ordering::Relaxed),
            tasks_panicked: self.tasks_panicked.load(Ordering::Relaxed),
            results_emitted: self.results_emitted.load(Ordering::Relaxed),
            results_skipped: self.results_skipped.load(Ordering::Relaxed),
            max_reorder_depth: self.max_reorder_depth.load(Ordering::Relaxed),
            latency_samples: 0,
            avg_latency_ns: 0,
            p50_latency_ns: 0,
            p99_latency_ns: 0,
            max_latency_ns: 0,
        };

        if let Some(histogram) = &self.latency_histogram {
            let histogram = histogram.read();
            snapshot.latency_samples = histogram.len();
            if histogram.len() > 0 {
                snapshot.avg_latency_ns = histogram.mean() as u64;
                snapshot.p50_latency_ns = histogram.value_at_quantile(0.50);
                snapshot.p99_latency_ns = histogram.value_at_quantile(0.99);
                snapshot.max_latency_ns = histogram.max();
            }
        }

        snapshot
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsSnapshot {
    pub uptime: Duration,
    pub tasks_submitted: u64,
    pub tasks_completed: u64,
    pub tasks_failed: u64,
    pub tasks_panicked: u64,
    pub results_emitted: u64,
    pub results_skipped: u64,
    pub max_reorder_depth: usize,
    pub latency_samples: u64,
    pub avg_latency_ns: u64,
    pub p50_latency_ns: u64,
    pub p99_latency_ns: u64,
    pub max_latency_ns: u64,
}

impl MetricsSnapshot {
    /// Tasks that have left a worker, successfully or not
    pub fn tasks_finished(&self) -> u64 {
        self.tasks_completed + self.tasks_failed + self.tasks_panicked
    }

    /// Tasks submitted but not yet finished by a worker
    pub fn tasks_in_flight(&self) -> u64 {
        self.tasks_submitted.saturating_sub(self.tasks_finished())
    }

    pub fn tasks_per_second(&self) -> f64 {
        let seconds = self.uptime.as_secs_f64();
        if seconds == 0.0 {
            return 0.0;
        }
        self.tasks_finished() as f64 / seconds
    }
}
