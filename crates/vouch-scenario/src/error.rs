use std::path::PathBuf;

use thiserror::Error;
use vouch_diff::{DiffReport, Format, Side};

/// Errors surfaced by scenario steps.
///
/// Every variant is a hard failure of the step that produced it.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("no {side} {format} payload has been loaded")]
    MissingPayload { side: Side, format: Format },

    #[error("no {0} has been set")]
    MissingData(&'static str),

    #[error("invalid {name}: {value:?}")]
    InvalidArgument { name: &'static str, value: String },

    #[error("payloads differ, {0}")]
    Mismatch(DiffReport),

    #[error("cannot read config {path:?}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("cannot render config: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    #[error("context error: {0}")]
    Context(#[from] vouch_context::ContextError),

    #[error("template error: {0}")]
    Template(#[from] vouch_template::TemplateError),

    #[error(transparent)]
    Diff(#[from] vouch_diff::DiffError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ScenarioResult<T> = Result<T, ScenarioError>;
