//! Snapshot loading for the SLA dashboard.
//!
//! Turns a producer payload (`data.js` or JSON) into an immutable
//! [`sla_core::Snapshot`] and serves it through a [`SnapshotStore`] that
//! swaps whole snapshots and keeps the last good one when a reload fails.

pub mod error;
pub mod loader;
pub mod parser;
pub mod store;

pub use error::{LoadError, LoadResult};
pub use loader::{
    decode_orders, decode_sla, load, load_bytes, load_data_js, load_file, load_json,
    SourceFormat, ORDERS_BINDING, SLA_BINDING,
};
pub use parser::{parse_bindings, Binding};
pub use store::{ReloadOutcome, ReloadPolicy, SnapshotStore, StoreStatus};
