//! Tree flattening: projecting a nested tree into `(path, leaf)` pairs.
//!
//! Arrays contribute `[i]` segments, objects contribute `.key` segments (the
//! first segment carries no leading dot) and every scalar, `null` included,
//! is a leaf. Empty arrays and objects produce nothing, so a container path is
//! never a key of its own.
//!
//! Traversal is pre-order: object members in enumeration order, then array
//! elements in index order.

use serde_json::Value;
use tracing::debug;
use vouch_types::{child_index, child_key};

use crate::error::Result;
use crate::origin::Origin;
use crate::traits::ContextStore;

/// Lazy iterator over the scalar leaves of a tree.
#[derive(Debug)]
pub struct Leaves<'a> {
    stack: Vec<(String, &'a Value)>,
}

impl<'a> Leaves<'a> {
    /// Walk `tree`, prefixing every emitted path with `prefix`.
    pub fn with_prefix(tree: &'a Value, prefix: impl Into<String>) -> Self {
        Self {
            stack: vec![(prefix.into(), tree)],
        }
    }
}

impl<'a> Iterator for Leaves<'a> {
    type Item = (String, &'a Value);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((path, node)) = self.stack.pop() {
            match node {
                Value::Array(items) => {
                    for (index, item) in items.iter().enumerate().rev() {
                        self.stack.push((child_index(&path, index), item));
                    }
                }
                Value::Object(members) => {
                    for (key, member) in members.iter().rev() {
                        self.stack.push((child_key(&path, key), member));
                    }
                }
                scalar => return Some((path, scalar)),
            }
        }
        None
    }
}

/// Leaves of `tree` with paths relative to its root.
pub fn leaves(tree: &Value) -> Leaves<'_> {
    Leaves::with_prefix(tree, "")
}

/// Collect every leaf of `tree` with an owned value.
pub fn flatten(tree: &Value) -> Vec<(String, Value)> {
    leaves(tree)
        .map(|(path, value)| (path, value.clone()))
        .collect()
}

/// Write every leaf of `tree` into `store` under `origin`.
///
/// Returns the number of keys written.
pub fn publish<S>(store: &S, origin: Origin, tree: &Value) -> Result<usize>
where
    S: ContextStore + ?Sized,
{
    let mut written = 0;
    for (path, value) in leaves(tree) {
        store.set(&origin.key(&path), value.clone())?;
        written += 1;
    }
    debug!(origin = %origin, keys = written, "published tree into context");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryContextStore;
    use serde_json::json;

    fn paths(tree: &Value) -> Vec<String> {
        leaves(tree).map(|(path, _)| path).collect()
    }

    #[test]
    fn nested_objects_and_arrays() {
        let tree = json!({"a": {"b": [{"c": 1}, 2]}, "d": null});
        assert_eq!(
            flatten(&tree),
            vec![
                ("a.b[0].c".to_string(), json!(1)),
                ("a.b[1]".to_string(), json!(2)),
                ("d".to_string(), json!(null)),
            ]
        );
    }

    #[test]
    fn keeps_document_order() {
        let tree: Value = serde_json::from_str(r#"{"z": 1, "a": 2, "m": 3}"#).unwrap();
        assert_eq!(paths(&tree), vec!["z", "a", "m"]);
    }

    #[test]
    fn root_array_uses_bare_brackets() {
        assert_eq!(paths(&json!([true, false])), vec!["[0]", "[1]"]);
    }

    #[test]
    fn root_scalar_has_empty_path() {
        assert_eq!(flatten(&json!("plain")), vec![(String::new(), json!("plain"))]);
    }

    #[test]
    fn empty_containers_produce_nothing() {
        assert!(flatten(&json!({})).is_empty());
        assert!(flatten(&json!([])).is_empty());
        assert_eq!(paths(&json!({"a": [], "b": {}, "c": 0})), vec!["c"]);
    }

    #[test]
    fn prefix_is_prepended() {
        let tree = json!({"id": 7, "tags": ["x"]});
        let collected: Vec<String> = Leaves::with_prefix(&tree, "user").map(|(p, _)| p).collect();
        assert_eq!(collected, vec!["user.id", "user.tags[0]"]);
    }

    #[test]
    fn publish_writes_origin_keys() {
        let store = InMemoryContextStore::new();
        let tree = json!({"user": {"id": 7, "roles": ["admin"]}});
        let written = publish(&store, Origin::ResponseData, &tree).unwrap();

        assert_eq!(written, 2);
        assert_eq!(store.get("ResponseData_user.id").unwrap(), Some(json!(7)));
        assert_eq!(store.get("ResponseData_user.roles[0]").unwrap(), Some(json!("admin")));
        assert_eq!(store.get("ResponseData_user").unwrap(), None);
    }

    #[test]
    fn publish_scalar_root_uses_bare_origin() {
        let store = InMemoryContextStore::new();
        publish(&store, Origin::RequestData, &json!(42)).unwrap();
        assert_eq!(store.get("RequestData").unwrap(), Some(json!(42)));
    }

    #[test]
    fn republish_overwrites() {
        let store = InMemoryContextStore::new();
        publish(&store, Origin::ResponseData, &json!({"id": 1})).unwrap();
        publish(&store, Origin::ResponseData, &json!({"id": 2})).unwrap();
        assert_eq!(store.get("ResponseData_id").unwrap(), Some(json!(2)));
    }
}
