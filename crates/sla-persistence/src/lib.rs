//! Snapshot output for the SLA dashboard.
//!
//! Renders a snapshot as the `data.js` script the dashboard pages include,
//! or as a standalone JSON document, and replaces the target file atomically
//! so a reader never observes a half-written snapshot.

pub mod error;
pub mod render;
pub mod writer;

pub use error::{PersistenceError, PersistenceResult};
pub use render::{render_data_js, render_json, OutputFormat, WriterConfig};
pub use writer::SnapshotWriter;
