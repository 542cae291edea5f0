//! Scenario facade for Vouch.
//!
//! A [`Scenario`] is the unit a test step operates on. It owns its own
//! context store, so scenarios running side by side never see each other's
//! values, and it wires the template engine and the diff engine together:
//! payloads are expanded when loaded, flattened into the context when set,
//! and compared with every difference reported as a hard failure.

pub mod cell;
pub mod config;
pub mod error;
pub mod scenario;
pub mod state;

pub use cell::{infer_cell, infer_row};
pub use config::ScenarioConfig;
pub use error::{ScenarioError, ScenarioResult};
pub use scenario::Scenario;
pub use state::{parse_flag, RequestState, ResponseState};

// Re-export key types
pub use vouch_context::{ContextStore, InMemoryContextStore, Origin};
pub use vouch_diff::{DiffReport, Difference, Format, ScanMatch, Side, TolerantKeys, XmlOptions};
pub use vouch_template::TargetType;
pub use vouch_types::{TypeName, Value};
