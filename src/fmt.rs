//! Text rendering of sample values and output lines.

use std::fmt::Write as _;

use crate::model::{Record, ScalarValue};

/// Separator between fields of an output line.
pub const FIELD_DELIMITER: &str = ", ";

/// Renders one value.
///
/// Floats always carry three fractional digits (`5.0` -> `"5.000"`); null renders
/// as `"null"`; everything else uses its natural text form.
pub fn format_value(value: &ScalarValue) -> String {
    match value {
        ScalarValue::Null => "null".to_string(),
        ScalarValue::Bool(b) => b.to_string(),
        ScalarValue::Integer(i) => i.to_string(),
        ScalarValue::Float(f) => format!("{:.3}", f),
        ScalarValue::Text(s) => s.clone(),
    }
}

/// Builds `<timestamp_ms>, <v1>, <v2>, ...` from a record, values in key order.
///
/// An empty record yields the timestamp alone.
pub fn format_line(timestamp_ms: i64, record: &Record) -> String {
    let mut line = timestamp_ms.to_string();
    for value in record.values() {
        let _ = write!(line, "{}{}", FIELD_DELIMITER, format_value(value));
    }
    line
}

/// Builds the `key: value` lines printed by the one-shot dump.
pub fn format_entries(record: &Record) -> Vec<String> {
    record
        .iter()
        .map(|(key, value)| format!("{}: {}", key, format_value(value)))
        .collect()
}
