//! Error types for template expansion.

use thiserror::Error;
use vouch_types::TargetType;

/// Errors that can occur while expanding a template.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The context store could not be read.
    #[error("context error: {0}")]
    Context(#[from] vouch_context::ContextError),
}

/// A value could not be converted to the requested type.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("cannot convert {value} to {target}: {reason}")]
pub struct CoercionError {
    pub value: String,
    pub target: TargetType,
    pub reason: String,
}

/// Convenience type alias for template operations.
pub type Result<T> = std::result::Result<T, TemplateError>;
