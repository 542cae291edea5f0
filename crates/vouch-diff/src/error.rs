//! Error types for the diff crate.
//!
//! Structural mismatches are never errors; they are reported through
//! [`DiffReport`](crate::DiffReport). These variants cover everything that
//! stops a comparison or assertion from producing a verdict at all.

use std::path::PathBuf;

use vouch_types::{TypeError, TypeName};

use crate::document::Format;

/// Errors that can occur during diff operations.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// A path expression could not be parsed.
    #[error("invalid path expression {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    /// A path expression matched nothing where a single node was required.
    #[error("no value found at path {path}")]
    NodeNotFound { path: String },

    /// A single-field assertion did not hold.
    #[error("assertion failed at {path}: expected {expected}, got {actual}")]
    AssertionFailed {
        path: String,
        expected: String,
        actual: String,
    },

    /// A payload could not be parsed.
    #[error("{format} parse error: {message}")]
    Parse { format: Format, message: String },

    /// An amendment value could not be cast to the type of the node it replaces.
    #[error("cannot cast {input:?} to {target} at {path}: {reason}")]
    CastFailed {
        path: String,
        input: String,
        target: TypeName,
        reason: String,
    },

    /// No document in a folder satisfied the comparison.
    #[error("no matching document in {dir:?} ({candidates} candidates compared)")]
    NoMatchingDocument { dir: PathBuf, candidates: usize },

    /// A type name given by the caller is not recognized.
    #[error(transparent)]
    Type(#[from] TypeError),

    /// Filesystem error while scanning a folder.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
