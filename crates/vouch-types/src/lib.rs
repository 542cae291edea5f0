//! Foundation types for Vouch.
//!
//! This crate provides the vocabulary shared by the context store, the
//! template engine and the diff engine. Every other Vouch crate depends on
//! `vouch-types`.
//!
//! Trees are plain [`serde_json::Value`]s (built with `preserve_order`, so
//! object members keep document order). XML payloads are projected into the
//! same shape before they reach any engine.
//!
//! # Key Types
//!
//! - [`TypeName`] — Dynamic type of a node (`string`, `number`, ...)
//! - [`TargetType`] — Coercion target requested from the template engine
//! - [`FieldPath`] / [`Segment`] — Normalized `$.a[0].b` paths
//! - [`canonical_text`] — The text a value is substituted and asserted as

pub mod error;
pub mod kind;
pub mod path;
pub mod text;

pub use error::TypeError;
pub use kind::{TargetType, TypeName};
pub use path::{child_index, child_key, terminal_segment, FieldPath, Segment, ROOT};
pub use text::canonical_text;

/// The tree type every engine operates on.
pub use serde_json::Value;
