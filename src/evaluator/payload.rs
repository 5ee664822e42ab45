//! Locating the structured object inside free-form model output.

use serde_json::{Map, Value};

use crate::constants::{RAW_RESPONSE_KEEP_CHARS, truncate_chars};

/// A response that did not contain a parsable JSON object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnparsablePayload {
    /// The first characters of the candidate text.
    pub raw: String,
}

/// Extracts the JSON object from a model response.
///
/// Tolerates prose around the object and fenced code blocks: the fence body is taken
/// when present, then everything from the first `{` to the last `}`.
pub fn extract_object(response: &str) -> Result<Map<String, Value>, UnparsablePayload> {
    let candidate = object_span(strip_fence(response.trim()));

    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(UnparsablePayload {
            raw: truncate_chars(candidate, RAW_RESPONSE_KEEP_CHARS).to_string(),
        }),
    }
}

fn strip_fence(text: &str) -> &str {
    let body_start = if let Some(pos) = text.find("```json") {
        pos + "```json".len()
    } else if let Some(pos) = text.find("```") {
        pos + "```".len()
    } else {
        return text;
    };

    let rest = &text[body_start..];
    let body = match rest.find("```") {
        Some(end) => &rest[..end],
        None => rest,
    };
    body.trim()
}

fn object_span(text: &str) -> &str {
    let Some(start) = text.find('{') else {
        return text;
    };
    match text.rfind('}') {
        Some(end) if end > start => &text[start..=end],
        _ => &text[start..],
    }
}

// Lenient field accessors. Models are inconsistent about types, so numbers may arrive
// as strings and lists may hold objects instead of strings.

pub(crate) fn get_bool(map: &Map<String, Value>, key: &str) -> Option<bool> {
    match map.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" => Some(true),
            "false" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

pub(crate) fn get_f64(map: &Map<String, Value>, key: &str) -> Option<f64> {
    match map.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse().ok(),
        _ => None,
    }
}

pub(crate) fn get_string(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

pub(crate) fn get_objects<'a>(map: &'a Map<String, Value>, key: &str) -> Vec<&'a Value> {
    match map.get(key) {
        Some(Value::Array(items)) => items.iter().collect(),
        _ => Vec::new(),
    }
}

pub(crate) fn get_string_list(map: &Map<String, Value>, key: &str) -> Vec<String> {
    get_objects(map, key)
        .into_iter()
        .filter_map(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        })
        .collect()
}
