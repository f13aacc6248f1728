//! Command orchestration.
//!
//! - `check`: load and validate one snapshot file
//! - `rebuild`: derive KPIs from order records and write a new snapshot
//! - `watch`: keep a [`SnapshotStore`] fresh from a file on an interval

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde_json::Value;
use sla_core::{
    validate, OrderRecord, PaymentsSummary, Snapshot, SnapshotMetadata, Summary, ValidationReport,
};
use sla_kpi::{compute_payments_data, compute_sla_data};
use sla_loader::{decode_orders, load, load_file, LoadError, ReloadOutcome, SnapshotStore};
use sla_persistence::{OutputFormat, SnapshotWriter, WriterConfig};
use sla_telemetry::Metrics;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};
use tracing::{debug, info, warn};

/// Outcome of `check`.
#[derive(Debug, Clone)]
pub struct CheckReport {
    pub snapshot: Snapshot,
    pub report: ValidationReport,
}

/// Outcome of `rebuild`.
#[derive(Debug, Clone)]
pub struct RebuildReport {
    pub path: PathBuf,
    pub format: OutputFormat,
    pub bytes: usize,
    pub orders: usize,
    pub summary: Summary,
    pub payments: PaymentsSummary,
    pub report: ValidationReport,
}

/// Main application.
pub struct Application {
    config: AppConfig,
    writer: SnapshotWriter,
}

impl Application {
    pub fn new(config: AppConfig) -> Self {
        let writer = SnapshotWriter::new(config.writer.clone());
        Self { config, writer }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Snapshot path to use when a command was given none.
    pub fn snapshot_path(&self, path: Option<PathBuf>) -> PathBuf {
        path.unwrap_or_else(|| PathBuf::from(&self.config.loader.snapshot_path))
    }

    /// Load and validate `path`.
    ///
    /// Violations are reported, and turned into an error when `strict` (or
    /// `loader.strict`) is set.
    pub fn check(&self, path: &Path, strict: bool) -> AppResult<CheckReport> {
        let start = Instant::now();
        let result = load_file(path);
        Metrics::load_duration(start.elapsed().as_secs_f64() * 1000.0);

        let snapshot = result.map_err(|e| {
            Metrics::load_failed(e.kind());
            e
        })?;
        Metrics::load_succeeded();

        let report = validate(snapshot.sla());
        for violation in report.iter() {
            Metrics::violation(violation.kind());
            warn!(kind = violation.kind(), %violation, "Snapshot invariant violated");
        }

        let summary = snapshot.summary();
        info!(
            path = %path.display(),
            total_orders = summary.total_orders,
            done = summary.done_orders,
            in_progress = summary.in_progress_orders,
            not_done = summary.not_done_orders,
            on_time_rate = summary.on_time_rate,
            total_amount = %summary.total_amount,
            open_orders = summary.open_orders,
            last_update = %summary.last_update,
            orders = snapshot.orders().len(),
            violations = report.len(),
            "Snapshot checked"
        );

        if (strict || self.config.loader.strict) && !report.is_clean() {
            return Err(AppError::Violations {
                count: report.len(),
                first: report.violations[0].to_string(),
            });
        }

        Ok(CheckReport { snapshot, report })
    }

    /// Derive a fresh snapshot from the orders in `orders_path` and write it to `out`.
    ///
    /// Rows without a job order number are dropped before anything is derived
    /// or written.
    pub fn rebuild(
        &self,
        orders_path: &Path,
        out: &Path,
        format: Option<OutputFormat>,
        now: DateTime<Utc>,
    ) -> AppResult<RebuildReport> {
        let mut orders = read_orders(orders_path)?;
        let read = orders.len();
        orders.retain(OrderRecord::is_tracked);
        info!(
            path = %orders_path.display(),
            orders = orders.len(),
            untracked = read - orders.len(),
            "Orders loaded"
        );

        let today = now.date_naive();
        let sla = compute_sla_data(&orders, &self.config.kpi, today);
        let payments = compute_payments_data(&orders, &self.config.kpi, today);
        let report = validate(&sla);
        for violation in report.iter() {
            warn!(kind = violation.kind(), %violation, "Derived snapshot invariant violated");
        }

        let metadata = SnapshotMetadata {
            last_update: now.naive_utc(),
            source_sheet: Some(self.config.writer.source.clone()),
            total_records: orders.len() as u64,
        };
        let order_count = orders.len();
        let payments_summary = payments.summary.clone();
        let snapshot = Snapshot::new(sla, orders)
            .with_metadata(metadata)
            .with_payments(payments);

        let writer = match format {
            Some(format) => SnapshotWriter::new(WriterConfig {
                format,
                ..self.config.writer.clone()
            }),
            None => self.writer.clone(),
        };
        let format = writer.config().format;
        let bytes = writer.write_snapshot(out, &snapshot, now)?;
        Metrics::snapshot_written(format.as_str());

        Ok(RebuildReport {
            path: out.to_path_buf(),
            format,
            bytes,
            orders: order_count,
            summary: snapshot.summary().clone(),
            payments: payments_summary,
            report,
        })
    }

    /// Reload `path` into `store` once, recording metrics.
    pub fn reload_once(&self, store: &SnapshotStore, path: &Path) -> AppResult<ReloadOutcome> {
        let start = Instant::now();
        let result = store.reload(path, self.config.loader.policy());
        Metrics::load_duration(start.elapsed().as_secs_f64() * 1000.0);

        match &result {
            Ok(outcome) => {
                Metrics::load_succeeded();
                for violation in outcome.report.iter() {
                    Metrics::violation(violation.kind());
                }
                if let Some(snapshot) = store.current() {
                    let summary = snapshot.summary();
                    Metrics::snapshot_installed(
                        outcome.generation,
                        summary.total_orders,
                        summary.on_time_rate,
                    );
                }
            }
            Err(e) => Metrics::load_failed(e.kind()),
        }
        Metrics::stale(store.is_stale());
        self.export_metrics();

        result.map_err(AppError::from)
    }

    /// Reload `path` into `store` every `watch.interval_secs` until `shutdown`
    /// resolves. Returns the number of reload attempts.
    ///
    /// A failed reload is logged and the previous snapshot keeps being served.
    pub async fn watch<F>(&self, path: &Path, store: &SnapshotStore, shutdown: F) -> u64
    where
        F: Future<Output = ()>,
    {
        let mut interval = tokio::time::interval(Duration::from_secs(self.config.watch.interval_secs));
        let mut last_modified: Option<SystemTime> = None;
        let mut attempts = 0u64;
        tokio::pin!(shutdown);

        info!(
            path = %path.display(),
            interval_secs = self.config.watch.interval_secs,
            strict = self.config.loader.strict,
            "Watching snapshot"
        );

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let modified = modified_at(path);
                    if self.config.watch.reload_on_change
                        && modified.is_some()
                        && modified == last_modified
                    {
                        debug!(path = %path.display(), "Snapshot unchanged, skipping reload");
                    } else {
                        last_modified = modified;
                        attempts += 1;
                        if let Err(e) = self.reload_once(store, path) {
                            warn!(error = %e, stale = store.is_stale(), "Reload failed");
                        }
                    }
                }

                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        let status = store.status();
        info!(
            attempts,
            generation = status.generation,
            stale = status.stale,
            "Watch stopped"
        );
        attempts
    }

    /// Run [`watch`](Self::watch) until Ctrl-C.
    pub async fn run_watch(&self, path: &Path) -> SnapshotStore {
        let store = SnapshotStore::new();
        self.watch(path, &store, async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await;
        store
    }

    fn export_metrics(&self) {
        let Some(path) = &self.config.watch.metrics_path else {
            return;
        };
        let result = Metrics::encode()
            .map_err(AppError::from)
            .and_then(|text| self.writer.write(path, &text).map_err(AppError::from));
        if let Err(e) = result {
            warn!(path = %path, error = %e, "Failed to export metrics");
        }
    }
}

/// Read order records from a JSON array or from an existing snapshot's
/// `ORDERS_DATA` / `orders`.
pub fn read_orders(path: &Path) -> AppResult<Vec<OrderRecord>> {
    let text = std::fs::read_to_string(path)?;
    let body = text.trim_start_matches('\u{feff}').trim_start();

    if body.starts_with('[') {
        let value: Value = serde_json::from_str(body).map_err(|e| LoadError::Parse {
            line: e.line(),
            message: e.to_string(),
        })?;
        return Ok(decode_orders(value, "orders")?);
    }

    let (_, orders) = load(&text)?.into_parts();
    Ok(orders)
}

fn modified_at(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_orders_from_array() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("orders.json");
        std::fs::write(
            &path,
            r#"[{"job_order_no": "JO-1", "cost": "1,200"}, {"job_order_no": 2}]"#,
        )
        .unwrap();

        let orders = read_orders(&path).unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].cost.as_ref().and_then(|c| c.as_text()), Some("1,200"));
    }

    #[test]
    fn test_read_orders_names_bad_record() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("orders.json");
        std::fs::write(&path, r#"[{"job_order_no": "JO-1"}, {"project": "NEOM"}]"#).unwrap();

        match read_orders(&path).unwrap_err() {
            AppError::Load(e) => assert_eq!(e.field(), Some("orders[1]")),
            other => panic!("Expected Load error, got {other:?}"),
        }
    }

    #[test]
    fn test_read_orders_truncated_array_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("orders.json");
        std::fs::write(&path, r#"[{"job_order_no": "JO-1"}"#).unwrap();

        match read_orders(&path).unwrap_err() {
            AppError::Load(e) => assert_eq!(e.kind(), "parse_error"),
            other => panic!("Expected Load error, got {other:?}"),
        }
    }

    #[test]
    fn test_snapshot_path_falls_back_to_config() {
        let app = Application::new(AppConfig::default());
        assert_eq!(app.snapshot_path(None), PathBuf::from("data.js"));
        assert_eq!(
            app.snapshot_path(Some(PathBuf::from("out/data.js"))),
            PathBuf::from("out/data.js")
        );
    }
}
