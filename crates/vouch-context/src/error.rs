//! Error types for context store operations.

use thiserror::Error;

/// Errors that can occur during context store operations.
#[derive(Debug, Error)]
pub enum ContextError {
    /// A lock guarding the store was poisoned by a panicking writer.
    #[error("context store lock poisoned: {0}")]
    LockPoisoned(String),
}

/// Convenience type alias for context store operations.
pub type Result<T> = std::result::Result<T, ContextError>;
