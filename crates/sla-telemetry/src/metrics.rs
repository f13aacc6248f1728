//! Prometheus metrics for the SLA dashboard.
//!
//! Covers:
//! - Snapshot load outcomes and duration
//! - Invariant violations by kind
//! - Served snapshot state (generation, staleness, order count, on-time rate)
//! - Snapshot writes
//!
//! # Panics
//!
//! Metric registration uses `unwrap()`. Registration only fails on duplicate
//! metric names, which is a programming error caught on first use.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_gauge, register_histogram, register_int_gauge, CounterVec,
    Encoder, Gauge, Histogram, IntGauge, TextEncoder,
};

use crate::error::{TelemetryError, TelemetryResult};

/// Snapshot load attempts.
/// Labels: outcome (ok/parse_error/schema_error/invariant_error/io_error)
pub static SNAPSHOT_LOADS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "sla_snapshot_loads_total",
        "Snapshot load attempts by outcome",
        &["outcome"]
    )
    .unwrap()
});

/// Snapshot load duration in milliseconds.
pub static SNAPSHOT_LOAD_DURATION_MS: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "sla_snapshot_load_duration_ms",
        "Time to read, parse and validate a snapshot in milliseconds",
        vec![1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 5000.0]
    )
    .unwrap()
});

/// Invariant violations found in loaded snapshots.
pub static SNAPSHOT_VIOLATIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "sla_snapshot_violations_total",
        "Snapshot invariant violations by kind",
        &["kind"]
    )
    .unwrap()
});

/// 1 while an older snapshot is served after a failed reload.
pub static SNAPSHOT_STALE: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "sla_snapshot_stale",
        "Served snapshot is stale after a failed reload (1=stale)"
    )
    .unwrap()
});

/// Generation of the served snapshot.
pub static SNAPSHOT_GENERATION: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "sla_snapshot_generation",
        "Generation of the currently served snapshot"
    )
    .unwrap()
});

/// `summary.total_orders` of the served snapshot.
pub static SNAPSHOT_ORDERS: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "sla_snapshot_orders",
        "Total orders in the currently served snapshot"
    )
    .unwrap()
});

/// `summary.on_time_rate` of the served snapshot, in percent.
pub static SNAPSHOT_ON_TIME_RATE: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!(
        "sla_snapshot_on_time_rate",
        "On-time completion rate of the served snapshot (percent)"
    )
    .unwrap()
});

/// Snapshot files written.
/// Labels: format (js/json)
pub static SNAPSHOTS_WRITTEN_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "sla_snapshots_written_total",
        "Snapshot files written by format",
        &["format"]
    )
    .unwrap()
});

/// Metrics helper for recording values.
pub struct Metrics;

impl Metrics {
    pub fn load_succeeded() {
        SNAPSHOT_LOADS_TOTAL.with_label_values(&["ok"]).inc();
    }

    /// Record a failed load. `kind` is the load error kind label.
    pub fn load_failed(kind: &str) {
        SNAPSHOT_LOADS_TOTAL.with_label_values(&[kind]).inc();
    }

    /// Record the snapshot that is now served.
    pub fn snapshot_installed(generation: u64, total_orders: u64, on_time_rate: f64) {
        SNAPSHOT_GENERATION.set(generation as i64);
        SNAPSHOT_ORDERS.set(total_orders as i64);
        SNAPSHOT_ON_TIME_RATE.set(on_time_rate);
        SNAPSHOT_STALE.set(0);
    }

    pub fn load_duration(duration_ms: f64) {
        SNAPSHOT_LOAD_DURATION_MS.observe(duration_ms);
    }

    pub fn violation(kind: &str) {
        SNAPSHOT_VIOLATIONS_TOTAL.with_label_values(&[kind]).inc();
    }

    pub fn stale(is_stale: bool) {
        SNAPSHOT_STALE.set(if is_stale { 1 } else { 0 });
    }

    pub fn snapshot_written(format: &str) {
        SNAPSHOTS_WRITTEN_TOTAL.with_label_values(&[format]).inc();
    }

    /// Render every registered metric in the Prometheus text format.
    pub fn encode() -> TelemetryResult<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder
            .encode(&prometheus::gather(), &mut buffer)
            .map_err(|e| TelemetryError::Metrics(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| TelemetryError::Metrics(e.to_string()))
    }
}
