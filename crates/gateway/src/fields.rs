//! Required-field checks for `methodBody` payloads.

use serde_json::{Map, Value};

use crate::error::{AppError, AppResult};

/// Names of the fields that are absent, `null`, or an empty string, sorted.
pub fn missing_fields(fields: &[(&str, Option<&Value>)]) -> Vec<String> {
    let mut missing: Vec<String> = fields
        .iter()
        .filter(|(_, value)| is_blank(*value))
        .map(|(name, _)| name.to_string())
        .collect();
    missing.sort();
    missing
}

/// Fail with a single message listing every missing field of `body`.
pub fn require(body: &Map<String, Value>, names: &[&str]) -> AppResult<()> {
    let fields: Vec<(&str, Option<&Value>)> = names.iter().map(|name| (*name, body.get(*name))).collect();
    let missing = missing_fields(&fields);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(AppError::MissingFields(missing))
    }
}

/// Path-safe text form of a scalar field: strings as-is, numbers printed.
pub fn scalar_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}
