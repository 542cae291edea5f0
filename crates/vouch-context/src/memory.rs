//! In-memory context store.
//!
//! [`InMemoryContextStore`] keeps every value in a `HashMap` protected by a
//! `RwLock`. One instance belongs to one scenario and is dropped with it.

use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::Value;

use crate::error::{ContextError, Result};
use crate::traits::ContextStore;

/// An in-memory implementation of [`ContextStore`].
#[derive(Debug)]
pub struct InMemoryContextStore {
    values: RwLock<HashMap<String, Value>>,
}

impl InMemoryContextStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
        }
    }

    /// Create a store pre-populated with `entries`.
    pub fn with_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let values = entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self {
            values: RwLock::new(values),
        }
    }
}

impl Default for InMemoryContextStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> ContextError {
    ContextError::LockPoisoned(e.to_string())
}

impl ContextStore for InMemoryContextStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let values = self.values.read().map_err(poisoned)?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut values = self.values.write().map_err(poisoned)?;
        values.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let mut values = self.values.write().map_err(poisoned)?;
        Ok(values.remove(key).is_some())
    }

    fn list(&self, prefix: &str) -> Result<Vec<(String, Value)>> {
        let values = self.values.read().map_err(poisoned)?;
        let mut result: Vec<(String, Value)> = values
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        result.sort_by(|(a, _), (b, _)| a.cmp(b));
        Ok(result)
    }

    fn len(&self) -> Result<usize> {
        let values = self.values.read().map_err(poisoned)?;
        Ok(values.len())
    }

    fn clear(&self) -> Result<()> {
        let mut values = self.values.write().map_err(poisoned)?;
        values.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_then_get() {
        let store = InMemoryContextStore::new();
        store.set("Foo", json!("bar")).unwrap();
        assert_eq!(store.get("Foo").unwrap(), Some(json!("bar")));
    }

    #[test]
    fn absent_key_is_none() {
        let store = InMemoryContextStore::new();
        assert_eq!(store.get("Missing").unwrap(), None);
        assert!(!store.contains("Missing").unwrap());
    }

    #[test]
    fn last_write_wins() {
        let store = InMemoryContextStore::new();
        store.set("ResponseStatus", json!(200)).unwrap();
        store.set("ResponseStatus", json!(404)).unwrap();
        assert_eq!(store.get("ResponseStatus").unwrap(), Some(json!(404)));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn values_keep_their_type() {
        let store = InMemoryContextStore::new();
        store.set("list", json!([1, 2])).unwrap();
        store.set("flag", json!(true)).unwrap();
        assert_eq!(store.get("list").unwrap(), Some(json!([1, 2])));
        assert_eq!(store.get("flag").unwrap(), Some(json!(true)));
    }

    #[test]
    fn keys_are_not_validated() {
        let store = InMemoryContextStore::new();
        store.set("", json!(1)).unwrap();
        store.set("a b{c}[0]", json!(2)).unwrap();
        assert_eq!(store.get("").unwrap(), Some(json!(1)));
        assert_eq!(store.get("a b{c}[0]").unwrap(), Some(json!(2)));
    }

    #[test]
    fn remove_reports_existence() {
        let store = InMemoryContextStore::new();
        store.set("k", json!(1)).unwrap();
        assert!(store.remove("k").unwrap());
        assert!(!store.remove("k").unwrap());
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn list_filters_by_prefix_and_sorts() {
        let store = InMemoryContextStore::with_entries([
            ("ResponseData_b", json!(2)),
            ("RequestData_a", json!(0)),
            ("ResponseData_a", json!(1)),
        ]);
        let keys = store.keys_with_prefix("ResponseData_").unwrap();
        assert_eq!(keys, vec!["ResponseData_a", "ResponseData_b"]);
        assert_eq!(store.list("").unwrap().len(), 3);
    }

    #[test]
    fn clear_drops_everything() {
        let store = InMemoryContextStore::with_entries([("a", json!(1)), ("b", json!(2))]);
        store.clear().unwrap();
        assert_eq!(store.len().unwrap(), 0);
    }

    #[test]
    fn stores_are_isolated() {
        let first = InMemoryContextStore::new();
        let second = InMemoryContextStore::new();
        first.set("shared", json!("one")).unwrap();
        assert_eq!(second.get("shared").unwrap(), None);
    }
}
