use serde_json::{Map, Value};

/// Relation kind for a parent-to-child edge.
pub const FORWARD_HIERARCHY: &str = "System.LinkTypes.Hierarchy-Forward";

/// Read a work-item field as display text.
///
/// Strings are taken as-is, numbers and booleans are stringified. Null,
/// arrays and objects (identity refs and the like) count as absent.
pub fn field_text(fields: &Map<String, Value>, key: &str) -> Option<String> {
    value_text(fields.get(key)?)
}

pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub fn field_text_or(fields: &Map<String, Value>, key: &str, default: &str) -> String {
    field_text(fields, key).unwrap_or_else(|| default.to_string())
}

pub fn field_id(fields: &Map<String, Value>) -> Option<u64> {
    fields.get("System.Id").and_then(Value::as_u64)
}

/// Split a key-results value into one entry per non-blank line.
///
/// Already-split sequences pass through with blank entries dropped, so the
/// function is idempotent. Any other shape yields an empty list.
pub fn normalize_key_results(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) => split_lines(s),
        Some(Value::Array(arr)) => arr
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    }
}

pub fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Child id from a relation URL such as `.../_apis/wit/workItems/123`.
///
/// Only a purely numeric trailing segment counts; `.../workItems/` and
/// non-numeric tails are rejected.
pub fn child_id_from_url(url: &str) -> Option<u64> {
    let tail = url.rsplit('/').next()?;
    if tail.is_empty() || !tail.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    tail.parse().ok()
}
