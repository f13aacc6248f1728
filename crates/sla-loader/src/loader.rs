//! Snapshot loading.
//!
//! Two payload layouts are accepted:
//! 1. `data.js`: `const SLA_DATA = {...}; const ORDERS_DATA = [...];`
//! 2. JSON document: one object holding the `SLA_DATA` keys, plus optional
//!    `orders` and `metadata`.
//!
//! Loading is all-or-nothing. The first syntax problem is a `Parse` error,
//! the first missing or mistyped field is a `Schema` error naming it, and
//! nothing is defaulted to paper over either.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use sla_core::{OrderRecord, SlaData, Snapshot, SnapshotMetadata};
use std::path::Path;
use tracing::{debug, info};

use crate::error::{LoadError, LoadResult};
use crate::parser::{parse_bindings, take_binding};

/// Binding holding the summary-bearing structure.
pub const SLA_BINDING: &str = "SLA_DATA";
/// Binding holding the order rows.
pub const ORDERS_BINDING: &str = "ORDERS_DATA";

/// Alternative key names written by the JSON producer.
const TOP_PROJECTS_ALIASES: &[&str] = &["top_projects_by_amount"];
const SUPPLIERS_ALIASES: &[&str] = &["suppliers_by_amount"];
const PROJECTS_ORDERS_ALIASES: &[&str] = &["top_projects_by_orders"];
const EQUIPMENT_COST_ALIASES: &[&str] = &["equipment_by_amount"];

/// Payload layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    DataJs,
    Json,
}

impl SourceFormat {
    /// A payload whose first significant character is `{` is a JSON document.
    pub fn detect(source: &str) -> Self {
        let body = source.trim_start_matches('\u{feff}').trim_start();
        if body.starts_with('{') {
            Self::Json
        } else {
            Self::DataJs
        }
    }
}

/// Load a snapshot from source text, detecting its layout.
pub fn load(source: &str) -> LoadResult<Snapshot> {
    let format = SourceFormat::detect(source);
    let snapshot = match format {
        SourceFormat::DataJs => load_data_js(source)?,
        SourceFormat::Json => load_json(source)?,
    };

    debug!(
        ?format,
        total_orders = snapshot.summary().total_orders,
        order_rows = snapshot.orders().len(),
        "Snapshot decoded"
    );
    Ok(snapshot)
}

/// Load from raw bytes. Invalid UTF-8 is a parse error.
pub fn load_bytes(bytes: &[u8]) -> LoadResult<Snapshot> {
    let source = std::str::from_utf8(bytes).map_err(|e| {
        let line = bytes[..e.valid_up_to()].iter().filter(|b| **b == b'\n').count() + 1;
        LoadError::Parse {
            line,
            message: format!("payload is not valid UTF-8: {e}"),
        }
    })?;
    load(source)
}

/// Read and load a snapshot file.
pub fn load_file(path: impl AsRef<Path>) -> LoadResult<Snapshot> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let snapshot = load_bytes(&bytes)?;

    info!(
        path = %path.display(),
        bytes = bytes.len(),
        total_orders = snapshot.summary().total_orders,
        order_rows = snapshot.orders().len(),
        last_update = %snapshot.summary().last_update,
        "Snapshot loaded"
    );
    Ok(snapshot)
}

/// Load the `data.js` layout.
pub fn load_data_js(source: &str) -> LoadResult<Snapshot> {
    let mut bindings = parse_bindings(source)?;

    let sla = take_binding(&mut bindings, SLA_BINDING)
        .ok_or_else(|| LoadError::schema(SLA_BINDING, "binding not found"))?;
    let orders = take_binding(&mut bindings, ORDERS_BINDING)
        .ok_or_else(|| LoadError::schema(ORDERS_BINDING, "binding not found"))?;

    for other in &bindings {
        debug!(name = %other.name, "Ignoring unrelated binding");
    }

    let sla = decode_sla(sla.value, SLA_BINDING)?;
    let orders = decode_orders(orders.value, ORDERS_BINDING)?;
    Ok(Snapshot::new(sla, orders))
}

/// Load the JSON document layout.
pub fn load_json(source: &str) -> LoadResult<Snapshot> {
    let value: Value = serde_json::from_str(source.trim_start_matches('\u{feff}')).map_err(|e| {
        LoadError::Parse {
            line: e.line(),
            message: e.to_string(),
        }
    })?;

    let mut object = match value {
        Value::Object(object) => object,
        _ => return Err(LoadError::schema("$", "expected a JSON object")),
    };

    let orders = match object.remove("orders") {
        Some(value) => decode_orders(value, "orders")?,
        None => Vec::new(),
    };
    let metadata = match object.remove("metadata") {
        Some(value) => Some(decode::<SnapshotMetadata>(value, "metadata")?),
        None => None,
    };

    let sla = decode_sla(Value::Object(object), "$")?;
    let snapshot = Snapshot::new(sla, orders);
    Ok(match metadata {
        Some(metadata) => snapshot.with_metadata(metadata),
        None => snapshot,
    })
}

/// Decode the summary-bearing structure, naming the offending key on failure.
pub fn decode_sla(value: Value, binding: &str) -> LoadResult<SlaData> {
    let mut object = match value {
        Value::Object(object) => object,
        other => {
            return Err(LoadError::schema(
                binding,
                format!("expected an object, found {}", type_name(&other)),
            ))
        }
    };

    Ok(SlaData {
        summary: required(&mut object, "summary", &[])?,
        status: required(&mut object, "status", &[])?,
        top_suppliers: required(&mut object, "top_suppliers", &[])?,
        top_projects: required(&mut object, "top_projects", TOP_PROJECTS_ALIASES)?,
        equipment_distribution: required(&mut object, "equipment_distribution", &[])?,
        monthly_trend: required(&mut object, "monthly_trend", &[])?,
        suppliers: optional(&mut object, "suppliers", SUPPLIERS_ALIASES)?,
        projects_orders: optional(&mut object, "projects_orders", PROJECTS_ORDERS_ALIASES)?,
        projects_amounts: optional(&mut object, "projects_amounts", &[])?,
        equipment_count: optional(&mut object, "equipment_count", &[])?,
        equipment_cost: optional(&mut object, "equipment_cost", EQUIPMENT_COST_ALIASES)?,
        company_breakdown: optional(&mut object, "company_breakdown", &[])?,
    })
}

/// Decode the order rows; a bad row is reported as `<binding>[index]`.
pub fn decode_orders(value: Value, binding: &str) -> LoadResult<Vec<OrderRecord>> {
    let rows = match value {
        Value::Array(rows) => rows,
        other => {
            return Err(LoadError::schema(
                binding,
                format!("expected an array, found {}", type_name(&other)),
            ))
        }
    };

    rows.into_iter()
        .enumerate()
        .map(|(i, row)| decode(row, &format!("{binding}[{i}]")))
        .collect()
}

fn take(object: &mut Map<String, Value>, key: &str, aliases: &[&str]) -> Option<Value> {
    object
        .remove(key)
        .or_else(|| aliases.iter().find_map(|alias| object.remove(*alias)))
}

fn required<T: DeserializeOwned>(
    object: &mut Map<String, Value>,
    key: &str,
    aliases: &[&str],
) -> LoadResult<T> {
    let value = take(object, key, aliases)
        .ok_or_else(|| LoadError::schema(key, "required field is missing"))?;
    decode(value, key)
}

fn optional<T: DeserializeOwned + Default>(
    object: &mut Map<String, Value>,
    key: &str,
    aliases: &[&str],
) -> LoadResult<T> {
    match take(object, key, aliases) {
        Some(value) => decode(value, key),
        None => Ok(T::default()),
    }
}

fn decode<T: DeserializeOwned>(value: Value, field: &str) -> LoadResult<T> {
    serde_json::from_value(value).map_err(|e| LoadError::schema(field, e))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
