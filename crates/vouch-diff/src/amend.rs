//! Type-preserving edits: replace the nodes a path selects with text cast to
//! each node's current type.

use serde_json::Value;
use vouch_types::{FieldPath, Segment, TypeName};

use crate::error::{DiffError, DiffResult};
use crate::query::PathQuery;

/// Cast `input` to a node of type `target`.
///
/// Strings are kept verbatim and so is a `null` target, which becomes a
/// string. Containers are parsed as JSON.
pub fn cast_to_type(input: &str, target: TypeName) -> Result<Value, String> {
    match target {
        TypeName::String | TypeName::Null => Ok(Value::String(input.to_string())),
        TypeName::Number => {
            let trimmed = input.trim();
            if let Ok(n) = trimmed.parse::<i64>() {
                return Ok(Value::Number(n.into()));
            }
            trimmed
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| "not a number".to_string())
        }
        TypeName::Boolean => match input {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err("expected true or false".to_string()),
        },
        TypeName::Array | TypeName::Object => {
            serde_json::from_str(input).map_err(|e| format!("invalid JSON: {e}"))
        }
    }
}

/// Replace every node `expr` selects in `tree`, returning how many changed.
///
/// All casts are checked before anything is written, so a failure leaves
/// `tree` untouched.
pub fn amend_at_path(tree: &mut Value, expr: &str, input: &str) -> DiffResult<usize> {
    let query = PathQuery::parse(expr)?;
    let matches = query.select(tree);
    if matches.is_empty() {
        return Err(DiffError::NodeNotFound {
            path: expr.to_string(),
        });
    }

    let mut edits: Vec<(FieldPath, Value)> = Vec::with_capacity(matches.len());
    for found in matches {
        let target = TypeName::of(found.value);
        let value = cast_to_type(input, target).map_err(|reason| DiffError::CastFailed {
            path: found.path.to_string(),
            input: input.to_string(),
            target,
            reason,
        })?;
        edits.push((found.path, value));
    }

    let count = edits.len();
    for (path, value) in edits {
        if let Some(slot) = node_mut(tree, &path) {
            *slot = value;
        }
    }
    tracing::debug!(expr, count, "amended tree");
    Ok(count)
}

fn node_mut<'a>(tree: &'a mut Value, path: &FieldPath) -> Option<&'a mut Value> {
    path.segments()
        .iter()
        .try_fold(tree, |node, segment| match segment {
            Segment::Key(key) => node.get_mut(key.as_str()),
            Segment::Index(index) => node.get_mut(*index),
        })
}
