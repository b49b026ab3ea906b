use serde_json::Value;

use crate::models::Record;

/// Header row for `records`: every field name, in the order first seen.
pub fn collect_headers(records: &[Record]) -> Vec<String> {
    let mut headers: Vec<String> = Vec::new();
    for record in records {
        for key in record.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }
    headers
}

/// A value as it lands in a single cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell<'a> {
    Blank,
    Text(&'a str),
    Number(f64),
    Bool(bool),
    Json(String),
}

impl<'a> From<&'a Value> for Cell<'a> {
    fn from(value: &'a Value) -> Self {
        match value {
            Value::Null => Cell::Blank,
            Value::String(s) => Cell::Text(s),
            Value::Number(n) => n
                .as_f64()
                .map(Cell::Number)
                .unwrap_or_else(|| Cell::Json(n.to_string())),
            Value::Bool(b) => Cell::Bool(*b),
            other => Cell::Json(other.to_string()),
        }
    }
}

/// Turn a float read back from a sheet into a JSON number, preferring an
/// integer when nothing is lost.
pub fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < 9.0e15 {
        Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}
