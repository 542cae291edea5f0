use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("unknown type name: {0}")]
    UnknownTypeName(String),

    #[error("unknown coercion target: {0}")]
    UnknownTarget(String),
}
