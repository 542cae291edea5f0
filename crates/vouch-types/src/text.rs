//! Canonical text form of tree values.

use serde_json::Value;

/// The text form of a value: strings verbatim, everything else as compact
/// JSON (`null`, `true`, `12`, `[1,2]`, `{"a":1}`).
pub fn canonical_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strings_are_bare_everything_else_is_json() {
        assert_eq!(canonical_text(&json!("bar")), "bar");
        assert_eq!(canonical_text(&json!(12)), "12");
        assert_eq!(canonical_text(&json!(true)), "true");
        assert_eq!(canonical_text(&json!(null)), "null");
        assert_eq!(canonical_text(&json!({"a": [1, 2]})), r#"{"a":[1,2]}"#);
    }
}
