use serde_json::{Map, Value};

use crate::models::Record;

/// Parse a submission body. `content_type` picks the format; without one,
/// JSON is tried first and form-urlencoded second.
pub fn parse_body(content_type: Option<&str>, body: &[u8]) -> Result<Record, String> {
    let value = match content_type {
        Some(ct) if ct.contains("json") => {
            serde_json::from_slice(body).map_err(|e| format!("Invalid JSON: {e}"))?
        }
        Some(ct) if ct.contains("x-www-form-urlencoded") || ct == "form" => {
            parse_form_urlencoded(body)?
        }
        Some(ct) => return Err(format!("Unsupported input format: {ct}")),
        None => serde_json::from_slice(body)
            .or_else(|_| parse_form_urlencoded(body))
            .map_err(|e| format!("Unable to parse body: {e}"))?,
    };

    match value {
        Value::Object(map) => Ok(map),
        other => Err(format!("Expected an object of fields, got {}", kind(&other))),
    }
}

fn parse_form_urlencoded(body: &[u8]) -> Result<Value, String> {
    let body_str = std::str::from_utf8(body).map_err(|e| format!("Invalid UTF-8: {e}"))?;

    let mut map = Map::new();
    for (k, v) in form_urlencoded::parse(body_str.trim().as_bytes()) {
        map.insert(k.into_owned(), Value::String(v.into_owned()));
    }
    Ok(Value::Object(map))
}

/// Parse `key=value` pairs given on the command line. Values that read back
/// unchanged as a number or a boolean keep that type. Everything else stays
/// text exactly as typed, so codes like `0012` are not turned into numbers.
pub fn parse_assignments<S: AsRef<str>>(pairs: &[S]) -> Result<Record, String> {
    let mut map = Map::new();
    for pair in pairs {
        let pair = pair.as_ref();
        let (key, raw) = pair
            .split_once('=')
            .ok_or_else(|| format!("Expected key=value, got '{pair}'"))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(format!("Missing field name in '{pair}'"));
        }
        map.insert(key.to_string(), infer_value(raw));
    }
    Ok(map)
}

fn infer_value(raw: &str) -> Value {
    if let Ok(i) = raw.parse::<i64>() {
        if i.to_string() == raw {
            return Value::from(i);
        }
    }
    if let Ok(f) = raw.parse::<f64>() {
        let number = serde_json::Number::from_f64(f);
        if let Some(number) = number.filter(|n| n.to_string() == raw) {
            return Value::Number(number);
        }
    }
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(raw.to_string()),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
