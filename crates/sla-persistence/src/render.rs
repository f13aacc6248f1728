//! Snapshot rendering.
//!
//! Output is pretty-printed with two-space indentation and keeps non-ASCII
//! text (Arabic supplier names) as-is rather than `\u` escaping it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sla_core::{OrderRecord, PaymentsData, SlaData, Snapshot};
use std::fmt::Write as _;
use std::str::FromStr;

use crate::error::{PersistenceError, PersistenceResult};

/// File layout to write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `const NAME = <json>;` script included by the dashboard pages.
    #[default]
    Js,
    /// Single JSON document with `metadata` and `orders` alongside the KPIs.
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Js => "js",
            Self::Json => "json",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = PersistenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "js" | "data.js" => Ok(Self::Js),
            "json" => Ok(Self::Json),
            _ => Err(PersistenceError::UnknownFormat(s.to_string())),
        }
    }
}

/// Snapshot writer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriterConfig {
    /// Maximum number of raw orders embedded in `ORDERS_DATA`.
    #[serde(default = "default_orders_limit")]
    pub orders_limit: usize,
    /// First header line of `data.js`.
    #[serde(default = "default_title")]
    pub title: String,
    /// Where the data came from, shown in the header.
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default)]
    pub format: OutputFormat,
    /// Also emit `TRANSPORTATION_DATA`, which the transportation page reads.
    #[serde(default = "default_true")]
    pub transportation_alias: bool,
    /// Emit `PAYMENTS_DATA` when the snapshot carries a payments payload.
    #[serde(default = "default_true")]
    pub payments: bool,
}

fn default_orders_limit() -> usize {
    200
}

fn default_title() -> String {
    "NESMA Supply Chain Management - Dashboard Data".to_string()
}

fn default_source() -> String {
    "Smartsheet".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            orders_limit: default_orders_limit(),
            title: default_title(),
            source: default_source(),
            format: OutputFormat::default(),
            transportation_alias: default_true(),
            payments: default_true(),
        }
    }
}

/// Render the `data.js` script for `sla`, `payments` and `orders`.
///
/// Only the first `orders_limit` orders are embedded.
pub fn render_data_js(
    sla: &SlaData,
    payments: Option<&PaymentsData>,
    orders: &[OrderRecord],
    config: &WriterConfig,
    now: DateTime<Utc>,
) -> PersistenceResult<String> {
    let sla_json = serde_json::to_string_pretty(sla)?;
    let shown = &orders[..orders.len().min(config.orders_limit)];
    let orders_json = serde_json::to_string_pretty(shown)?;

    let mut out = String::with_capacity(sla_json.len() * 2 + orders_json.len() + 256);
    // Writing into a String cannot fail.
    let _ = writeln!(out, "// {}", config.title);
    let _ = writeln!(out, "// Auto-synced from {}", config.source);
    let _ = writeln!(out, "// Last updated: {}", now.format("%Y-%m-%d %H:%M:%S UTC"));
    let _ = writeln!(out);
    let _ = writeln!(out, "// SLA Dashboard Data");
    let _ = writeln!(out, "const SLA_DATA = {sla_json};");
    if config.transportation_alias {
        let _ = writeln!(out);
        let _ = writeln!(out, "// Transportation Dashboard Data");
        let _ = writeln!(out, "const TRANSPORTATION_DATA = {sla_json};");
    }
    if let Some(payments) = payments.filter(|_| config.payments) {
        let payments_json = serde_json::to_string_pretty(payments)?;
        let _ = writeln!(out);
        let _ = writeln!(out, "// Payments Dashboard Data");
        let _ = writeln!(out, "const PAYMENTS_DATA = {payments_json};");
    }
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "// Raw Orders Data ({} of {})",
        shown.len(),
        orders.len()
    );
    let _ = writeln!(out, "const ORDERS_DATA = {orders_json};");

    Ok(out)
}

/// Render `snapshot` as one JSON document.
///
/// The KPI keys sit at the top level next to `metadata` and `payments` (when
/// present) and the full `orders` array.
pub fn render_json(snapshot: &Snapshot) -> PersistenceResult<String> {
    let mut doc = Map::new();

    if let Some(metadata) = snapshot.metadata() {
        doc.insert("metadata".to_string(), serde_json::to_value(metadata)?);
    }
    if let Value::Object(sla) = serde_json::to_value(snapshot.sla())? {
        doc.extend(sla);
    }
    if let Some(payments) = snapshot.payments() {
        doc.insert("payments".to_string(), serde_json::to_value(payments)?);
    }
    doc.insert("orders".to_string(), serde_json::to_value(snapshot.orders())?);

    let mut out = serde_json::to_string_pretty(&Value::Object(doc))?;
    out.push('\n');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use sla_core::{Amount, Leaderboard, SnapshotMetadata, Summary};

    fn payments() -> PaymentsData {
        let mut data = PaymentsData::empty(NaiveDate::from_ymd_opt(2025, 3, 2).unwrap());
        data.summary.total_invoices = 2;
        data.payment_status.paid = 2;
        data
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 2, 4, 0, 0).unwrap()
    }

    fn sla() -> SlaData {
        let mut data = SlaData::empty(Summary::empty(NaiveDate::from_ymd_opt(2025, 3, 2).unwrap()));
        data.top_suppliers = Leaderboard::from_entries(vec![
            ("شركة الفيصل".to_string(), 3),
            ("Bahri".to_string(), 1),
        ]);
        data.top_projects = Leaderboard::from_entries(vec![("NEOM Line".to_string(), Amount::from(900u64))]);
        data
    }

    fn orders(n: u64) -> Vec<OrderRecord> {
        (1..=n).map(|i| OrderRecord::new(format!("JO-{i}").as_str())).collect()
    }

    #[test]
    fn test_data_js_layout() {
        let js = render_data_js(&sla(), None, &orders(2), &WriterConfig::default(), now()).unwrap();

        assert!(js.starts_with("// NESMA Supply Chain Management - Dashboard Data\n"));
        assert!(js.contains("// Last updated: 2025-03-02 04:00:00 UTC\n"));
        assert!(js.contains("const SLA_DATA = {\n  \"summary\": {"));
        assert!(js.contains("const TRANSPORTATION_DATA = {"));
        assert!(js.contains("// Raw Orders Data (2 of 2)"));
        assert!(js.ends_with("];\n"));
    }

    #[test]
    fn test_non_ascii_is_not_escaped() {
        let js = render_data_js(&sla(), None, &[], &WriterConfig::default(), now()).unwrap();
        assert!(js.contains("\"شركة الفيصل\": 3"));
        assert!(!js.contains("\\u"));
    }

    #[test]
    fn test_orders_are_capped() {
        let config = WriterConfig {
            orders_limit: 3,
            transportation_alias: false,
            payments: false,
            ..Default::default()
        };
        let js = render_data_js(&sla(), Some(&payments()), &orders(5), &config, now()).unwrap();

        assert!(js.contains("\"JO-3\""));
        assert!(!js.contains("\"JO-4\""));
        assert!(js.contains("(3 of 5)"));
        assert!(!js.contains("TRANSPORTATION_DATA"));
        assert!(!js.contains("PAYMENTS_DATA"));
    }

    #[test]
    fn test_payments_binding_sits_before_orders() {
        let js = render_data_js(
            &sla(),
            Some(&payments()),
            &orders(1),
            &WriterConfig::default(),
            now(),
        )
        .unwrap();

        let transportation_at = js.find("const TRANSPORTATION_DATA = ").unwrap();
        let payments_at = js.find("const PAYMENTS_DATA = {\n  \"summary\": {").unwrap();
        let orders_at = js.find("const ORDERS_DATA = ").unwrap();
        assert!(transportation_at < payments_at && payments_at < orders_at);
        assert!(js.contains("\"Pending Approval\": 0"));
    }

    #[test]
    fn test_leaderboard_order_is_kept() {
        let js = render_data_js(&sla(), None, &[], &WriterConfig::default(), now()).unwrap();
        let first = js.find("شركة الفيصل").unwrap();
        let second = js.find("Bahri").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_json_document_layout() {
        let metadata = SnapshotMetadata {
            last_update: NaiveDate::from_ymd_opt(2025, 3, 2)
                .unwrap()
                .and_hms_opt(4, 0, 0)
                .unwrap(),
            source_sheet: Some("Job Orders".to_string()),
            total_records: 2,
        };
        let snapshot = Snapshot::new(sla(), orders(2))
            .with_metadata(metadata)
            .with_payments(payments());

        let json = render_json(&snapshot).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();

        assert_eq!(keys[0], "metadata");
        assert_eq!(keys[1], "summary");
        assert_eq!(keys.last().unwrap().as_str(), "orders");
        assert_eq!(value["metadata"]["total_records"], 2);
        assert_eq!(value["orders"].as_array().unwrap().len(), 2);
        assert_eq!(keys[keys.len() - 2].as_str(), "payments");
        assert_eq!(value["payments"]["summary"]["total_invoices"], 2);
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("js".parse::<OutputFormat>().unwrap(), OutputFormat::Js);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("csv".parse::<OutputFormat>().is_err());
    }
}
