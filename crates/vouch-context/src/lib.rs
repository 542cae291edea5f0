//! Context store for Vouch.
//!
//! The context store is the key/value memory a scenario accumulates while it
//! runs: request and response fields, loaded payloads, tolerated keys and
//! anything a step sets explicitly. Templates are resolved against it.
//!
//! # Architecture
//!
//! - Each scenario owns its own store. There is no process-wide context, so
//!   concurrent scenarios never observe each other's keys.
//! - Keys are namespaced by [`Origin`]: a response field `user.id` lands under
//!   `ResponseData_user.id`.
//! - Payload trees enter the store through [`flatten`]: a lazy iterator of
//!   `(path, leaf)` pairs, consumed by [`publish`].
//!
//! # Modules
//!
//! - [`error`] — Error types for store operations
//! - [`traits`] — The [`ContextStore`] trait defining the storage interface
//! - [`memory`] — [`InMemoryContextStore`], the default backend
//! - [`origin`] — Key namespaces
//! - [`flatten`] — Tree flattening and publishing

pub mod error;
pub mod flatten;
pub mod memory;
pub mod origin;
pub mod traits;

pub use error::{ContextError, Result};
pub use flatten::{flatten, leaves, publish, Leaves};
pub use memory::InMemoryContextStore;
pub use origin::Origin;
pub use traits::ContextStore;
