//! The [`ContextStore`] trait defining the context storage interface.
//!
//! Any backend implements this trait to provide the key/value memory that
//! templates are resolved against.

use serde_json::Value;

use crate::error::Result;

/// Storage backend for scenario context values.
///
/// Keys are free-form strings; no validation is applied. Writes always
/// overwrite and the last write wins.
pub trait ContextStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// Returns `Ok(None)` if the key was never set.
    fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Remove a key.
    ///
    /// Returns `Ok(true)` if the key existed, `Ok(false)` otherwise.
    fn remove(&self, key: &str) -> Result<bool>;

    /// List every entry whose key starts with `prefix`, sorted by key.
    ///
    /// Pass `""` to list everything.
    fn list(&self, prefix: &str) -> Result<Vec<(String, Value)>>;

    /// Number of stored keys.
    fn len(&self) -> Result<usize>;

    /// Drop every key.
    fn clear(&self) -> Result<()>;

    /// Returns `true` if `key` has been set.
    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Returns `true` if no key has been set.
    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Keys starting with `prefix`, sorted.
    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self.list(prefix)?.into_iter().map(|(key, _)| key).collect())
    }
}
