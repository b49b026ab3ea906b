use serde_json::Value;

use crate::models::Record;

/// Fields the management view relies on to tell submissions apart.
pub const REQUIRED_FIELDS: [&str; 2] = ["appName", "requestor"];
pub const DATE_FIELDS: [&str; 1] = ["dateRequested"];
pub const COUNT_FIELDS: [&str; 3] = ["prodServerCount", "nonProdServerCount", "drServerCount"];

/// Check a filled record. Returns warnings (doesn't reject).
pub fn validate_fields(record: &Record) -> Vec<String> {
    let mut warnings = Vec::new();

    for name in REQUIRED_FIELDS {
        match record.get(name) {
            None | Some(Value::Null) => warnings.push(format!("Missing required field: {name}")),
            Some(Value::String(s)) if s.trim().is_empty() => {
                warnings.push(format!("Required field is empty: {name}"))
            }
            _ => {}
        }
    }

    for name in DATE_FIELDS {
        if let Some(Value::String(s)) = record.get(name) {
            if !is_iso_date(s) {
                warnings.push(format!("Invalid date format: {name}"));
            }
        }
    }

    for name in COUNT_FIELDS {
        match record.get(name) {
            Some(Value::Number(n)) if n.as_u64().is_none() => {
                warnings.push(format!("Expected a non-negative whole number: {name}"));
            }
            Some(Value::String(s)) if s.parse::<u64>().is_err() => {
                warnings.push(format!("Invalid number format: {name}"));
            }
            Some(Value::Bool(_)) => {
                warnings.push(format!("Expected number, got boolean: {name}"));
            }
            _ => {}
        }
    }

    warnings
}

/// Accept ISO 8601: YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS...
fn is_iso_date(s: &str) -> bool {
    s.len() >= 10
        && s.is_char_boundary(10)
        && s.as_bytes().get(4) == Some(&b'-')
        && s.as_bytes().get(7) == Some(&b'-')
        && s[..4].parse::<u16>().is_ok()
        && s[5..7].parse::<u8>().is_ok_and(|m| (1..=12).contains(&m))
        && s[8..10].parse::<u8>().is_ok_and(|d| (1..=31).contains(&d))
}
