//! Atomic snapshot file writer.
//!
//! The dashboard reads `data.js` straight off disk, so the file is never
//! written in place:
//! - Contents go to a temp file in the target directory
//! - The temp file is fsynced, then renamed over the target
//! - A failed write leaves the previous snapshot untouched

use chrono::{DateTime, Utc};
use sla_core::Snapshot;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{PersistenceError, PersistenceResult};
use crate::render::{render_data_js, render_json, OutputFormat, WriterConfig};

/// Writes rendered snapshots to disk with replace-on-success semantics.
#[derive(Debug, Clone, Default)]
pub struct SnapshotWriter {
    config: WriterConfig,
}

impl SnapshotWriter {
    pub fn new(config: WriterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    /// Render `snapshot` in the configured format and write it to `path`.
    /// Returns the number of bytes written.
    pub fn write_snapshot(
        &self,
        path: impl AsRef<Path>,
        snapshot: &Snapshot,
        now: DateTime<Utc>,
    ) -> PersistenceResult<usize> {
        let contents = match self.config.format {
            OutputFormat::Js => render_data_js(
                snapshot.sla(),
                snapshot.payments(),
                snapshot.orders(),
                &self.config,
                now,
            )?,
            OutputFormat::Json => render_json(snapshot)?,
        };
        let bytes = self.write(path.as_ref(), &contents)?;

        info!(
            path = %path.as_ref().display(),
            format = self.config.format.as_str(),
            bytes,
            total_orders = snapshot.summary().total_orders,
            "Snapshot written"
        );
        Ok(bytes)
    }

    /// Atomically replace `path` with `contents`.
    pub fn write(&self, path: impl AsRef<Path>, contents: &str) -> PersistenceResult<usize> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(contents.as_bytes())?;
        tmp.as_file().sync_all()?;

        debug!(tmp = %tmp.path().display(), target = %path.display(), "Replacing snapshot file");

        // On failure the temp file is dropped and removed; the target is untouched.
        tmp.persist(path).map_err(|e| PersistenceError::Replace {
            path: path.display().to_string(),
            source: e.error,
        })?;
        sync_dir(dir)?;

        Ok(contents.len())
    }
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> PersistenceResult<()> {
    fs::File::open(dir)?.sync_all()?;
    Ok(())
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> PersistenceResult<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use sla_core::{SlaData, Summary};
    use tempfile::TempDir;

    fn snapshot() -> Snapshot {
        let summary = Summary::empty(NaiveDate::from_ymd_opt(2025, 3, 2).unwrap());
        Snapshot::new(SlaData::empty(summary), Vec::new())
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 2, 4, 0, 0).unwrap()
    }

    #[test]
    fn test_write_creates_parent_and_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("public/data.js");

        let writer = SnapshotWriter::default();
        let bytes = writer.write_snapshot(&path, &snapshot(), now()).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written.len(), bytes);
        assert!(written.contains("const SLA_DATA = "));
    }

    #[test]
    fn test_write_replaces_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data.js");
        fs::write(&path, "old").unwrap();

        let writer = SnapshotWriter::default();
        writer.write(&path, "new contents").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new contents");
        // No temp files left behind.
        let entries = fs::read_dir(temp_dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_failed_replace_keeps_previous_file() {
        let temp_dir = TempDir::new().unwrap();
        // Renaming a file over a non-empty directory fails.
        let path = temp_dir.path().join("data.js");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "x").unwrap();

        let err = SnapshotWriter::default().write(&path, "new").unwrap_err();
        assert!(matches!(err, PersistenceError::Replace { .. }));
        assert!(path.join("keep").exists());
    }

    #[test]
    fn test_json_format() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sla_data.json");
        let writer = SnapshotWriter::new(WriterConfig {
            format: OutputFormat::Json,
            ..Default::default()
        });

        writer.write_snapshot(&path, &snapshot(), now()).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["summary"]["total_orders"], 0);
        assert!(value["orders"].as_array().unwrap().is_empty());
    }
}
