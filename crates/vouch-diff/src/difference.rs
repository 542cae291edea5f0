//! Difference records and the report that collects them.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use vouch_types::TypeName;

/// Which side of a comparison lacks a key or index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// The first (expected) tree.
    #[serde(rename = "obj1")]
    Expected,
    /// The second (actual) tree.
    #[serde(rename = "obj2")]
    Actual,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expected => "expected",
            Self::Actual => "actual",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One discrepancy between an expected and an actual tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Difference {
    /// Same path, values of different type.
    TypeMismatch {
        path: String,
        expected: Value,
        actual: Value,
        expected_type: TypeName,
        actual_type: TypeName,
    },
    /// Same path, same scalar type, different value.
    ValueMismatch {
        path: String,
        expected: Value,
        actual: Value,
    },
    /// An object member present on one side only.
    MissingKey {
        path: String,
        key: String,
        missing_in: Side,
    },
    /// An array element present on one side only.
    MissingArrayIndex { path: String, missing_in: Side },
}

impl Difference {
    pub fn path(&self) -> &str {
        match self {
            Self::TypeMismatch { path, .. }
            | Self::ValueMismatch { path, .. }
            | Self::MissingKey { path, .. }
            | Self::MissingArrayIndex { path, .. } => path,
        }
    }

    /// The snake_case kind name, as serialized.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TypeMismatch { .. } => "type_mismatch",
            Self::ValueMismatch { .. } => "value_mismatch",
            Self::MissingKey { .. } => "missing_key",
            Self::MissingArrayIndex { .. } => "missing_array_index",
        }
    }
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TypeMismatch {
                path,
                expected,
                actual,
                expected_type,
                actual_type,
            } => write!(
                f,
                "type_mismatch at {path}: expected {expected_type} {expected}, actual {actual_type} {actual}"
            ),
            Self::ValueMismatch {
                path,
                expected,
                actual,
            } => write!(f, "value_mismatch at {path}: expected {expected}, actual {actual}"),
            Self::MissingKey {
                path,
                key,
                missing_in,
            } => write!(f, "missing_key at {path}: key {key:?} missing in {missing_in}"),
            Self::MissingArrayIndex { path, missing_in } => {
                write!(f, "missing_array_index at {path}: missing in {missing_in}")
            }
        }
    }
}

/// The result of comparing two trees.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DiffReport {
    /// Discrepancies in traversal order.
    pub differences: Vec<Difference>,
}

impl DiffReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the trees matched.
    pub fn is_empty(&self) -> bool {
        self.differences.is_empty()
    }

    /// Number of differences.
    pub fn len(&self) -> usize {
        self.differences.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Difference> {
        self.differences.iter()
    }

    /// Number of type mismatches.
    pub fn type_mismatches(&self) -> usize {
        self.count(|d| matches!(d, Difference::TypeMismatch { .. }))
    }

    /// Number of value mismatches.
    pub fn value_mismatches(&self) -> usize {
        self.count(|d| matches!(d, Difference::ValueMismatch { .. }))
    }

    /// Number of missing keys.
    pub fn missing_keys(&self) -> usize {
        self.count(|d| matches!(d, Difference::MissingKey { .. }))
    }

    /// Number of missing array indices.
    pub fn missing_indices(&self) -> usize {
        self.count(|d| matches!(d, Difference::MissingArrayIndex { .. }))
    }

    /// The distinct paths flagged by this report.
    pub fn paths(&self) -> BTreeSet<&str> {
        self.differences.iter().map(Difference::path).collect()
    }

    fn count(&self, predicate: impl Fn(&Difference) -> bool) -> usize {
        self.differences.iter().filter(|d| predicate(d)).count()
    }
}

impl fmt::Display for DiffReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("no differences");
        }
        writeln!(f, "{} difference(s):", self.len())?;
        for (i, difference) in self.differences.iter().enumerate() {
            writeln!(f, "  {}. {difference}", i + 1)?;
        }
        Ok(())
    }
}

impl IntoIterator for DiffReport {
    type Item = Difference;
    type IntoIter = std::vec::IntoIter<Difference>;

    fn into_iter(self) -> Self::IntoIter {
        self.differences.into_iter()
    }
}

impl<'a> IntoIterator for &'a DiffReport {
    type Item = &'a Difference;
    type IntoIter = std::slice::Iter<'a, Difference>;

    fn into_iter(self) -> Self::IntoIter {
        self.differences.iter()
    }
}
