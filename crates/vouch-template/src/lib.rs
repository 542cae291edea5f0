//! Template expansion for Vouch.
//!
//! Step arguments, payload files and path expressions may contain `{key}`
//! placeholders naming context values. Two expanders are provided:
//!
//! - [`expand_shallow`] — flat `{key}` tokens only; unknown keys are left as
//!   written.
//! - [`expand_deep`] — nested placeholders resolved innermost first, so a key
//!   may itself be assembled from other values (`{ResponseData_[{Index}].id}`).
//!   Unknown keys expand to the empty string.
//!
//! [`expand_deep_as`] additionally coerces the result to a [`TargetType`].

pub mod coerce;
pub mod error;
pub mod expand;

pub use coerce::{convert_or_keep, convert_value};
pub use error::{CoercionError, Result, TemplateError};
pub use expand::{expand_deep, expand_deep_as, expand_shallow, Expansion, Expander};
pub use vouch_types::{canonical_text, TargetType};
