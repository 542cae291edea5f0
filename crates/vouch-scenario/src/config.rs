use std::path::Path;

use serde::{Deserialize, Serialize};
use vouch_diff::XmlOptions;

use crate::error::{ScenarioError, ScenarioResult};

/// Settings shared by every step of a scenario.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Scope used when a comparison names none.
    pub default_scope: String,
    /// How XML payloads are projected into trees.
    pub xml: XmlOptions,
    /// Log a warning for every placeholder missing from the context.
    pub warn_on_unresolved: bool,
    /// Flatten request and response payloads into the context as they are set.
    pub publish_payloads: bool,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            default_scope: "$".to_string(),
            xml: XmlOptions::default(),
            warn_on_unresolved: true,
            publish_payloads: true,
        }
    }
}

impl ScenarioConfig {
    /// Parse a TOML document. Missing fields take their defaults.
    pub fn from_toml(text: &str) -> ScenarioResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> ScenarioResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ScenarioError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> ScenarioResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
