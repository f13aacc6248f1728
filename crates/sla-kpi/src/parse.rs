//! Lenient cell parsing.
//!
//! Sheet cells carry whatever the person typing entered. Both helpers fall
//! back to zero instead of failing, which is how the dashboard has always
//! treated unreadable costs and durations.

use rust_decimal::Decimal;
use sla_core::{Amount, CellValue};
use std::str::FromStr;

/// Parse a cost cell such as `1250`, `"4,100.50"` or `"SAR 4100.50"`.
///
/// Text cells keep only digits and `.` before parsing, so currency symbols,
/// separators and signs are dropped. Arabic-Indic digits are accepted.
pub fn parse_cost(value: &CellValue) -> Amount {
    match value {
        CellValue::Bool(b) => Amount::from(u64::from(*b)),
        CellValue::Number(n) => number_to_decimal(n).map(Amount::new).unwrap_or_default(),
        CellValue::Text(s) => {
            let cleaned: String = s.chars().filter_map(cost_char).collect();
            // "75 ر.س" leaves a trailing dot behind.
            let cleaned = cleaned.strip_suffix('.').unwrap_or(&cleaned);
            Decimal::from_str(cleaned)
                .map(Amount::new)
                .unwrap_or_default()
        }
    }
}

/// Parse a day-count cell. Unparsable or non-finite values become 0.
pub fn parse_days(value: &CellValue) -> f64 {
    let days = match value {
        CellValue::Bool(b) => f64::from(u8::from(*b)),
        CellValue::Number(n) => n.as_f64().unwrap_or(0.0),
        CellValue::Text(s) => s
            .trim()
            .chars()
            .map(|c| arabic_digit(c).unwrap_or(c))
            .collect::<String>()
            .parse::<f64>()
            .unwrap_or(0.0),
    };
    if days.is_finite() {
        days
    } else {
        0.0
    }
}

/// Cost of an order, zero when the cell is missing.
pub fn order_cost(cost: Option<&CellValue>) -> Amount {
    cost.map(parse_cost).unwrap_or_default()
}

fn number_to_decimal(n: &serde_json::Number) -> Option<Decimal> {
    if let Some(v) = n.as_i64() {
        return Some(Decimal::from(v));
    }
    if let Some(v) = n.as_u64() {
        return Some(Decimal::from(v));
    }
    // Shortest round-trip text keeps 4100.5 as 4100.5 rather than its binary expansion.
    let text = n.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

fn cost_char(c: char) -> Option<char> {
    match c {
        '0'..='9' | '.' => Some(c),
        _ => arabic_digit(c),
    }
}

/// ASCII digit for an Arabic-Indic or Extended Arabic-Indic digit.
fn arabic_digit(c: char) -> Option<char> {
    match c {
        '\u{0660}'..='\u{0669}' => char::from_digit(c as u32 - 0x0660, 10),
        '\u{06F0}'..='\u{06F9}' => char::from_digit(c as u32 - 0x06F0, 10),
        _ => None,
    }
}
