//! Swap-on-reload snapshot store.
//!
//! Holds the snapshot currently served to the dashboard. A reload either
//! replaces the whole snapshot or leaves the previous one in place and marks
//! the store stale; there is no merging and no partial update.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use sla_core::{validate, Snapshot, ValidationReport};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{LoadError, LoadResult};
use crate::loader::load_file;

/// How a reload treats invariant violations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReloadPolicy {
    /// Refuse snapshots that break an invariant instead of serving them flagged.
    pub strict: bool,
}

/// Result of a successful reload.
#[derive(Debug, Clone)]
pub struct ReloadOutcome {
    pub generation: u64,
    pub report: ValidationReport,
}

/// Point-in-time view of the store for health reporting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreStatus {
    /// Bumped on every installed snapshot; 0 means nothing loaded yet.
    pub generation: u64,
    pub loaded_at: Option<DateTime<Utc>>,
    /// The last reload failed and an older snapshot is being served.
    pub stale: bool,
    pub last_error: Option<String>,
    pub last_attempt_at: Option<DateTime<Utc>>,
    pub violations: usize,
}

#[derive(Debug, Default)]
struct StoreState {
    current: Option<Arc<Snapshot>>,
    status: StoreStatus,
}

/// Shared handle to the current snapshot. Cloning shares the same store.
#[derive(Clone, Default)]
pub struct SnapshotStore {
    inner: Arc<RwLock<StoreState>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot currently being served, if any.
    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.inner.read().current.clone()
    }

    pub fn status(&self) -> StoreStatus {
        self.inner.read().status.clone()
    }

    pub fn is_stale(&self) -> bool {
        self.inner.read().status.stale
    }

    /// Replace the served snapshot and clear staleness. Returns the new generation.
    pub fn install(&self, snapshot: Snapshot, report: &ValidationReport) -> u64 {
        let now = Utc::now();
        let mut state = self.inner.write();
        state.current = Some(Arc::new(snapshot));
        state.status.generation += 1;
        state.status.loaded_at = Some(now);
        state.status.last_attempt_at = Some(now);
        state.status.stale = false;
        state.status.last_error = None;
        state.status.violations = report.len();
        state.status.generation
    }

    /// Record a failed reload. The served snapshot is left untouched.
    pub fn mark_failed(&self, error: &LoadError) {
        let mut state = self.inner.write();
        state.status.last_attempt_at = Some(Utc::now());
        state.status.last_error = Some(error.to_string());
        // Nothing to be stale relative to until a first snapshot exists.
        state.status.stale = state.current.is_some();
    }

    /// Validate `snapshot` under `policy` and install it.
    pub fn accept(&self, snapshot: Snapshot, policy: ReloadPolicy) -> LoadResult<ReloadOutcome> {
        let report = validate(snapshot.sla());

        for violation in report.iter() {
            warn!(kind = violation.kind(), %violation, "Snapshot invariant violated");
        }

        if policy.strict && !report.is_clean() {
            let error = LoadError::Invariant {
                count: report.len(),
                first: report.violations[0].to_string(),
            };
            self.mark_failed(&error);
            return Err(error);
        }

        let generation = self.install(snapshot, &report);
        Ok(ReloadOutcome { generation, report })
    }

    /// Load `path` and swap it in. On any failure the previous snapshot stays
    /// in place and the store is marked stale.
    pub fn reload(&self, path: impl AsRef<Path>, policy: ReloadPolicy) -> LoadResult<ReloadOutcome> {
        let path = path.as_ref();
        let result = load_file(path).and_then(|snapshot| self.accept(snapshot, policy));

        match &result {
            Ok(outcome) => info!(
                path = %path.display(),
                generation = outcome.generation,
                violations = outcome.report.len(),
                "Snapshot installed"
            ),
            Err(e) => {
                // accept() already recorded invariant rejections.
                if !matches!(e, LoadError::Invariant { .. }) {
                    self.mark_failed(e);
                }
                warn!(
                    path = %path.display(),
                    error = %e,
                    stale = self.is_stale(),
                    "Snapshot reload failed, keeping previous snapshot"
                );
            }
        }

        result
    }
}

impl std::fmt::Debug for SnapshotStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.read();
        f.debug_struct("SnapshotStore")
            .field("generation", &state.status.generation)
            .field("stale", &state.status.stale)
            .field("loaded", &state.current.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sla_core::{SlaData, Summary};

    fn snapshot(total_orders: u64) -> Snapshot {
        let mut summary = Summary::empty(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        summary.total_orders = total_orders;
        summary.done_orders = total_orders;
        let mut sla = SlaData::empty(summary);
        sla.status.done = total_orders;
        Snapshot::new(sla, Vec::new())
    }

    #[test]
    fn test_install_swaps_whole_snapshot() {
        let store = SnapshotStore::new();
        assert!(store.current().is_none());
        assert_eq!(store.status().generation, 0);

        store.accept(snapshot(1), ReloadPolicy::default()).unwrap();
        let first = store.current().unwrap();

        let outcome = store.accept(snapshot(2), ReloadPolicy::default()).unwrap();
        assert_eq!(outcome.generation, 2);

        // Readers holding the old Arc keep a consistent view.
        assert_eq!(first.summary().total_orders, 1);
        assert_eq!(store.current().unwrap().summary().total_orders, 2);
    }

    #[test]
    fn test_failure_keeps_previous_and_flags_stale() {
        let store = SnapshotStore::new();
        store.accept(snapshot(5), ReloadPolicy::default()).unwrap();

        store.mark_failed(&LoadError::schema("summary", "required field is missing"));

        let status = store.status();
        assert!(status.stale);
        assert_eq!(status.generation, 1);
        assert!(status.last_error.unwrap().contains("summary"));
        assert_eq!(store.current().unwrap().summary().total_orders, 5);
    }

    #[test]
    fn test_failure_before_first_load_is_not_stale() {
        let store = SnapshotStore::new();
        store.mark_failed(&LoadError::schema("SLA_DATA", "binding not found"));
        assert!(!store.is_stale());
        assert!(store.status().last_error.is_some());
    }

    #[test]
    fn test_lenient_policy_serves_flagged_snapshot() {
        let store = SnapshotStore::new();
        let (mut sla, orders) = snapshot(3).into_parts();
        sla.status.not_done = 4;

        let outcome = store
            .accept(Snapshot::new(sla, orders), ReloadPolicy::default())
            .unwrap();
        assert!(!outcome.report.is_clean());
        assert_eq!(store.status().violations, outcome.report.len());
        // Not corrected.
        assert_eq!(store.current().unwrap().sla().status.not_done, 4);
    }

    #[test]
    fn test_strict_policy_rejects_flagged_snapshot() {
        let store = SnapshotStore::new();
        store.accept(snapshot(3), ReloadPolicy::default()).unwrap();

        let (mut sla, orders) = snapshot(3).into_parts();
        sla.summary.on_time_rate = 250.0;
        let err = store
            .accept(Snapshot::new(sla, orders), ReloadPolicy { strict: true })
            .unwrap_err();

        assert_eq!(err.kind(), "invariant_error");
        assert!(store.is_stale());
        assert_eq!(store.current().unwrap().summary().on_time_rate, 0.0);
    }
}
