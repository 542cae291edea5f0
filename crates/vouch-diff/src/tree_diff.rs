//! Tree-level diff: compare two payload trees and produce a list of
//! discrepancies.
//!
//! Walks both trees in lock step, keyed by member name for objects and by
//! position for arrays. Tolerant keys are skipped wherever they appear as an
//! object member name, including the last member of a scope.

use serde_json::Value;
use vouch_types::{child_index, terminal_segment, Segment, TypeName};

use crate::difference::{DiffReport, Difference, Side};
use crate::error::DiffResult;
use crate::query::PathQuery;

/// Key names exempt from comparison anywhere in the tree.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TolerantKeys(Vec<String>);

impl TolerantKeys {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.iter().any(|k| k == key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    /// Add a key, keeping declaration order and ignoring duplicates.
    pub fn insert(&mut self, key: impl Into<String>) {
        let key = key.into();
        if !self.contains(&key) {
            self.0.push(key);
        }
    }
}

impl<K: Into<String>> FromIterator<K> for TolerantKeys {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut keys = Self::new();
        for key in iter {
            keys.insert(key);
        }
        keys
    }
}

/// Compare `expected` against `actual`, reporting paths relative to `path`.
pub fn diff_tree(expected: &Value, actual: &Value, tolerant: &TolerantKeys, path: &str) -> DiffReport {
    let mut report = DiffReport::new();
    if !tolerant.contains(terminal_segment(path)) {
        compare(expected, actual, tolerant, path, &mut report.differences);
    }
    report
}

/// Compare the first node `query` selects on each side.
///
/// An empty selection short-circuits with a `missing_key` record per empty
/// side, keyed by the query expression.
pub fn diff_with_query(
    expected: &Value,
    actual: &Value,
    query: &PathQuery,
    tolerant: &TolerantKeys,
) -> DiffReport {
    let left = query.first(expected);
    let right = query.first(actual);

    match (left, right) {
        (Some(left), Some(right)) => {
            let mut report = DiffReport::new();
            let tolerated = matches!(
                left.path.segments().last(),
                Some(Segment::Key(key)) if tolerant.contains(key)
            );
            if !tolerated {
                let path = left.path.to_string();
                compare(left.value, right.value, tolerant, &path, &mut report.differences);
            }
            report
        }
        (left, right) => {
            let mut report = DiffReport::new();
            for (found, side) in [(left.is_some(), Side::Expected), (right.is_some(), Side::Actual)] {
                if !found {
                    report.differences.push(Difference::MissingKey {
                        path: query.expr().to_string(),
                        key: query.expr().to_string(),
                        missing_in: side,
                    });
                }
            }
            report
        }
    }
}

/// Parse `scope` and compare the first node it selects on each side.
pub fn diff_at_path(
    expected: &Value,
    actual: &Value,
    scope: &str,
    tolerant: &TolerantKeys,
) -> DiffResult<DiffReport> {
    let query = PathQuery::parse(scope)?;
    let report = diff_with_query(expected, actual, &query, tolerant);
    tracing::debug!(scope, differences = report.len(), "compared trees at scope");
    Ok(report)
}

fn compare(
    expected: &Value,
    actual: &Value,
    tolerant: &TolerantKeys,
    path: &str,
    out: &mut Vec<Difference>,
) {
    let expected_type = TypeName::of(expected);
    let actual_type = TypeName::of(actual);
    if expected_type != actual_type {
        out.push(Difference::TypeMismatch {
            path: path.to_string(),
            expected: expected.clone(),
            actual: actual.clone(),
            expected_type,
            actual_type,
        });
        return;
    }

    match (expected, actual) {
        (Value::Array(left), Value::Array(right)) => {
            for i in 0..left.len().max(right.len()) {
                let item_path = child_index(path, i);
                match (left.get(i), right.get(i)) {
                    (Some(l), Some(r)) => compare(l, r, tolerant, &item_path, out),
                    (Some(_), None) => out.push(Difference::MissingArrayIndex {
                        path: item_path,
                        missing_in: Side::Actual,
                    }),
                    (None, _) => out.push(Difference::MissingArrayIndex {
                        path: item_path,
                        missing_in: Side::Expected,
                    }),
                }
            }
        }
        (Value::Object(left), Value::Object(right)) => {
            let right_only = right.keys().filter(|key| !left.contains_key(*key));
            for key in left.keys().chain(right_only) {
                if tolerant.contains(key) {
                    continue;
                }
                let member_path = format!("{path}.{key}");
                match (left.get(key), right.get(key)) {
                    (Some(l), Some(r)) => compare(l, r, tolerant, &member_path, out),
                    (Some(_), None) => out.push(Difference::MissingKey {
                        path: member_path,
                        key: key.clone(),
                        missing_in: Side::Actual,
                    }),
                    (None, _) => out.push(Difference::MissingKey {
                        path: member_path,
                        key: key.clone(),
                        missing_in: Side::Expected,
                    }),
                }
            }
        }
        _ => {
            if !scalars_equal(expected, actual) {
                out.push(Difference::ValueMismatch {
                    path: path.to_string(),
                    expected: expected.clone(),
                    actual: actual.clone(),
                });
            }
        }
    }
}

/// Scalar equality; numbers compare by value so `1` equals `1.0`.
fn scalars_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => {
            if let (Some(l), Some(r)) = (l.as_i64(), r.as_i64()) {
                l == r
            } else if let (Some(l), Some(r)) = (l.as_u64(), r.as_u64()) {
                l == r
            } else {
                l.as_f64() == r.as_f64()
            }
        }
        _ => left == right,
    }
}
