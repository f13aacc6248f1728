//! Order records as exported from the job orders sheet.
//!
//! Spreadsheet cells are untyped: a cost can arrive as `1500`, `"1,500"` or
//! `"SAR 1500"`, and job order numbers are sometimes numeric. Those columns
//! are kept as raw [`CellValue`]s and interpreted at the point of use.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw spreadsheet cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl CellValue {
    /// Python-style truthiness: empty text, zero and `false` are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Number(n) => n.as_f64().map(|v| v != 0.0).unwrap_or(false),
            Self::Text(s) => !s.is_empty(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl Default for CellValue {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<u64> for CellValue {
    fn from(v: u64) -> Self {
        Self::Number(v.into())
    }
}

/// One tracked job order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CellValue>,
    pub job_order_no: CellValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_order_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requester: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_date: Option<String>,
    /// "Yes" when logistics performed the job.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_days: Option<CellValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    /// Cost excluding VAT.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<CellValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_applicable: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_received: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_receive_days: Option<CellValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_cycle_days: Option<CellValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

impl OrderRecord {
    pub fn new(job_order_no: impl Into<CellValue>) -> Self {
        Self {
            job_order_no: job_order_no.into(),
            ..Default::default()
        }
    }

    /// Rows without a job order number are sheet noise and never counted.
    pub fn is_tracked(&self) -> bool {
        self.job_order_no.is_truthy()
    }

    /// Invoice applicable is "Yes".
    pub fn is_invoiced(&self) -> bool {
        self.invoice_applicable.as_deref() == Some("Yes")
    }

    pub fn was_performed(&self) -> bool {
        self.performed.as_deref() == Some("Yes")
    }

    pub fn is_completed(&self) -> bool {
        non_empty(&self.completion_date).is_some()
    }

    /// `YYYY-MM` bucket of the job order date: its first seven characters.
    pub fn month(&self) -> Option<&str> {
        let date = non_empty(&self.job_order_date)?;
        Some(match date.char_indices().nth(7) {
            Some((cut, _)) => &date[..cut],
            None => date,
        })
    }
}

/// `Some` only for a present, non-empty string.
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}
