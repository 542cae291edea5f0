//! Single-field assertions.

use serde_json::Value;
use vouch_types::{canonical_text, TypeName};

use crate::error::{DiffError, DiffResult};
use crate::query::PathQuery;

/// Assert that the first node `expr` selects has the given text and type.
///
/// The node's text is its string content for strings and compact JSON
/// otherwise, so `null` reads as `null` and `1.5` as `1.5`.
pub fn assert_field(tree: &Value, expr: &str, value: &str, type_name: TypeName) -> DiffResult<()> {
    let query = PathQuery::parse(expr)?;
    let found = query.first(tree).ok_or_else(|| DiffError::NodeNotFound {
        path: expr.to_string(),
    })?;

    let actual_text = canonical_text(found.value);
    let actual_type = TypeName::of(found.value);
    if actual_text == value && actual_type == type_name {
        tracing::debug!(path = %found.path, "field assertion holds");
        return Ok(());
    }

    Err(DiffError::AssertionFailed {
        path: found.path.to_string(),
        expected: format!("{type_name} {value:?}"),
        actual: format!("{actual_type} {actual_text:?}"),
    })
}

/// Like [`assert_field`] with the type given by name.
pub fn check_field(tree: &Value, expr: &str, value: &str, type_name: &str) -> DiffResult<()> {
    let type_name: TypeName = type_name.parse()?;
    assert_field(tree, expr, value, type_name)
}
