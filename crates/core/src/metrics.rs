//! Prometheus metrics for the parser and the engine transport.
//!
//! This module provides metrics for:
//! - Diagnostic lines by classification
//! - Parse errors and progress events
//! - Engine runs (count by result, wall time)

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Parser Metrics
// =============================================================================

/// Diagnostic lines seen, by line kind.
pub static LINES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("ffstream_lines_total", "Total diagnostic lines parsed"),
        &["kind"], // "input", "output", "stream", "progress", ...
    )
    .unwrap()
});

/// Lines that were recognised but could not be interpreted.
pub static PARSE_ERRORS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "ffstream_parse_errors_total",
        "Total malformed diagnostic lines",
    )
    .unwrap()
});

/// Progress records emitted.
pub static PROGRESS_EVENTS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "ffstream_progress_events_total",
        "Total progress records emitted",
    )
    .unwrap()
});

// =============================================================================
// Engine Metrics
// =============================================================================

/// Engine runs by result.
pub static RUNS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("ffstream_runs_total", "Total engine runs"),
        &["result"], // "success", "failed", "timeout", "spawn_error"
    )
    .unwrap()
});

/// Engine run wall time in seconds.
pub static RUN_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new("ffstream_run_duration_seconds", "Duration of engine runs")
            .buckets(vec![0.1, 0.5, 1.0, 5.0, 10.0, 30.0, 60.0, 300.0, 900.0, 3600.0]),
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(LINES_TOTAL.clone()),
        Box::new(PARSE_ERRORS.clone()),
        Box::new(PROGRESS_EVENTS.clone()),
        Box::new(RUNS_TOTAL.clone()),
        Box::new(RUN_DURATION.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::Registry;

    #[test]
    fn test_all_metrics_register() {
        let registry = Registry::new();
        for metric in all_metrics() {
            registry.register(metric).unwrap();
        }
        LINES_TOTAL.with_label_values(&["other"]).inc();
        let names: Vec<String> = registry
            .gather()
            .iter()
            .map(|family| family.get_name().to_string())
            .collect();
        assert!(names.contains(&"ffstream_lines_total".to_string()));
    }
}
