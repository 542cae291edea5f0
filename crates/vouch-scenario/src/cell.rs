//! Typing of step-table cells.
//!
//! Table cells arrive as text. Before they reach a request or response they
//! are given the most specific JSON type they spell.

use serde_json::{Map, Value};

/// Infer the value a cell spells: boolean, integer, `null`, JSON, else text.
pub fn infer_cell(text: &str) -> Value {
    let text = text.trim();
    match text {
        "true" | "True" | "TRUE" => return Value::Bool(true),
        "false" | "False" | "FALSE" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(n) = text.parse::<i64>() {
        return Value::Number(n.into());
    }
    if text.eq_ignore_ascii_case("null") {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// Build an object from `(key, cell)` rows, typing every cell.
pub fn infer_row<'a, I>(rows: I) -> Map<String, Value>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    rows.into_iter()
        .map(|(key, cell)| (key.to_string(), infer_cell(cell)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalars() {
        assert_eq!(infer_cell("TRUE"), json!(true));
        assert_eq!(infer_cell(" False "), json!(false));
        assert_eq!(infer_cell("42"), json!(42));
        assert_eq!(infer_cell("-7"), json!(-7));
        assert_eq!(infer_cell("NULL"), Value::Null);
        assert_eq!(infer_cell("1.5"), json!(1.5));
        assert_eq!(infer_cell("hello"), json!("hello"));
        assert_eq!(infer_cell(""), json!(""));
    }

    #[test]
    fn json_cells() {
        assert_eq!(infer_cell(r#"{"a": [1]}"#), json!({"a": [1]}));
        assert_eq!(infer_cell("[1, 2]"), json!([1, 2]));
        assert_eq!(infer_cell(r#""quoted""#), json!("quoted"));
    }

    #[test]
    fn rows_keep_order() {
        let row = infer_row([("b", "1"), ("a", "x")]);
        assert_eq!(Value::Object(row), json!({"b": 1, "a": "x"}));
        let row = infer_row([("z", "1"), ("y", "2")]);
        assert_eq!(row.keys().collect::<Vec<_>>(), vec!["z", "y"]);
    }
}
