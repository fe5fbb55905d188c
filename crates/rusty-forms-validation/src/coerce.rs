//! Raw input coercion (`value_as_number`, `value_as_date`)
//!
//! Inputs arrive as strings. A field registered with a coercion stores the
//! parsed value instead; parse failures are stored verbatim as `NaN` or an
//! invalid date and are never corrected.

use chrono::NaiveDate;
use rusty_forms_types::Value;
use serde::{Deserialize, Serialize};

/// How raw input text is turned into a stored value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueAs {
    /// Keep the string as typed
    #[default]
    Text,
    /// Parse as a float, `NaN` on failure
    Number,
    /// Parse as `YYYY-MM-DD`, invalid date on failure
    Date,
}

/// Coerce a raw input string
pub fn coerce(raw: &str, value_as: ValueAs) -> Value {
    match value_as {
        ValueAs::Text => Value::String(raw.to_string()),
        ValueAs::Number => Value::Number(parse_number(raw)),
        ValueAs::Date => Value::Date(parse_date(raw)),
    }
}

/// Coerce a value written programmatically.
///
/// Only strings are parsed; already typed values pass through unchanged.
pub fn coerce_value(value: Value, value_as: ValueAs) -> Value {
    match value {
        Value::String(raw) if value_as != ValueAs::Text => coerce(&raw, value_as),
        other => other,
    }
}

/// Whether `value` is the stored result of a failed coercion
pub fn is_coercion_failure(value: &Value, value_as: ValueAs) -> bool {
    match (value_as, value) {
        (ValueAs::Number, Value::Number(n)) => n.is_nan(),
        (ValueAs::Date, Value::Date(d)) => d.is_none(),
        _ => false,
    }
}

fn parse_number(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}
