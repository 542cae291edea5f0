//! Conversions between context values and requested result types.

use serde_json::{Number, Value};
use tracing::warn;
use vouch_types::{canonical_text, TargetType};

use crate::error::CoercionError;

fn failure(value: &Value, target: TargetType, reason: impl Into<String>) -> CoercionError {
    CoercionError {
        value: canonical_text(value),
        target,
        reason: reason.into(),
    }
}

fn parse_number(text: &str) -> Option<Number> {
    let text = text.trim();
    if let Ok(n) = text.parse::<i64>() {
        return Some(Number::from(n));
    }
    if let Ok(n) = text.parse::<u64>() {
        return Some(Number::from(n));
    }
    text.parse::<f64>().ok().and_then(Number::from_f64)
}

/// Convert `value` to `target`.
///
/// `null` only converts to the empty string. Strings are parsed for every
/// non-string target (`"42"`, `"true"`, `"[1,2]"`, `"{\"a\":1}"`).
pub fn convert_value(value: &Value, target: TargetType) -> Result<Value, CoercionError> {
    match (target, value) {
        (TargetType::String, Value::Null) => Ok(Value::String(String::new())),
        (TargetType::String, other) => Ok(Value::String(canonical_text(other))),
        (_, Value::Null) => Err(failure(value, target, "value is null")),

        (TargetType::Number, Value::Number(_)) => Ok(value.clone()),
        (TargetType::Number, Value::String(s)) => parse_number(s)
            .map(Value::Number)
            .ok_or_else(|| failure(value, target, "not a finite number")),

        (TargetType::Boolean, Value::Bool(_)) => Ok(value.clone()),
        (TargetType::Boolean, Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(failure(value, target, "expected true or false")),
        },

        (TargetType::Array, Value::Array(_)) | (TargetType::Object, Value::Object(_)) => {
            Ok(value.clone())
        }
        (TargetType::Array | TargetType::Object, Value::String(s)) => {
            let parsed: Value = serde_json::from_str(s)
                .map_err(|e| failure(value, target, e.to_string()))?;
            match (target, &parsed) {
                (TargetType::Array, Value::Array(_)) | (TargetType::Object, Value::Object(_)) => {
                    Ok(parsed)
                }
                _ => Err(failure(value, target, "parsed JSON has a different shape")),
            }
        }

        _ => Err(failure(value, target, "incompatible type")),
    }
}

/// Convert `value` to `target`, keeping it unchanged when that fails.
pub fn convert_or_keep(value: Value, target: TargetType) -> Value {
    match convert_value(&value, target) {
        Ok(converted) => converted,
        Err(e) => {
            warn!(error = %e, "coercion failed; keeping original value");
            value
        }
    }
}
