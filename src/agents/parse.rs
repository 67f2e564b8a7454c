//! Decode-with-defaults for model JSON output.
//!
//! Model responses are duck-typed; every completion is followed by a strict
//! decode step that tags the result (complete / partial / failed) and pulls
//! fields out with explicit defaults, so a malformed response can never
//! propagate a missing required field into a derived object.

use crate::models::ProjectedEffect;
use crate::scoring::normalize_score;
use serde_json::Value;

/// Tagged result of decoding one model response against a required-field
/// list.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    /// Every required field present.
    Complete(Value),
    /// Usable object, but some required fields were defaulted.
    Partial {
        value: Value,
        missing: Vec<String>,
    },
    /// No usable object at all; callers fall back to full defaults.
    Failed,
}

impl ParseOutcome {
    /// Classify a (possibly absent) model response.
    pub fn classify(body: Option<Value>, required: &[&str]) -> Self {
        let Some(value) = body else {
            return ParseOutcome::Failed;
        };
        if !value.is_object() {
            return ParseOutcome::Failed;
        }

        let missing: Vec<String> = required
            .iter()
            .filter(|key| value.get(**key).map_or(true, Value::is_null))
            .map(|key| key.to_string())
            .collect();

        if missing.is_empty() {
            ParseOutcome::Complete(value)
        } else {
            ParseOutcome::Partial { value, missing }
        }
    }

    /// The decoded value, if any survived.
    pub fn value(&self) -> Option<&Value> {
        match self {
            ParseOutcome::Complete(v) => Some(v),
            ParseOutcome::Partial { value, .. } => Some(value),
            ParseOutcome::Failed => None,
        }
    }
}

/// String field with default.
pub fn str_field(value: &Value, key: &str, default: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(default)
        .to_string()
}

/// Score field normalized to 0-100, with default. Accepts 0-1 floats,
/// 0-100 numbers, and numeric strings.
pub fn score_field(value: &Value, key: &str, default: u8) -> u8 {
    match value.get(key) {
        Some(Value::Number(n)) => n.as_f64().map(normalize_score).unwrap_or(default),
        Some(Value::String(s)) => s.trim().parse::<f64>().map(normalize_score).unwrap_or(default),
        _ => default,
    }
}

/// Boolean field with default.
pub fn bool_field(value: &Value, key: &str, default: bool) -> bool {
    value.get(key).and_then(Value::as_bool).unwrap_or(default)
}

/// String-array field; non-string entries are dropped, absent field is
/// empty.
pub fn str_list(value: &Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

/// Effect-list field: array of {description, confidence} objects. Entries
/// without a description are dropped; missing confidence defaults to 50.
pub fn effect_list(value: &Value, key: &str) -> Vec<ProjectedEffect> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    let description = item.get("description").and_then(Value::as_str)?;
                    if description.trim().is_empty() {
                        return None;
                    }
                    Some(ProjectedEffect {
                        description: description.trim().to_string(),
                        confidence: score_field(item, "confidence", 50),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}
