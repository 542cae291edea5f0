//! Request and response settings a scenario accumulates between steps.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The request a scenario is preparing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestState {
    pub headers: Map<String, Value>,
    pub params: Map<String, Value>,
    pub form: Map<String, Value>,
    pub method: Option<String>,
    /// Body text, after expansion.
    pub data: Option<String>,
    pub fail_on_status_code: Option<bool>,
    pub ignore_https_errors: Option<bool>,
    pub max_redirects: Option<u32>,
    pub max_retries: Option<u32>,
    /// Milliseconds.
    pub timeout: Option<u64>,
}

/// The response a scenario has received or stubbed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseState {
    pub data: Option<String>,
    pub body: Option<String>,
    pub content_type: Option<String>,
    pub headers: Map<String, Value>,
    pub path: Option<String>,
    pub status: Option<u16>,
}

/// Expected and actual payload text per format, kept as loaded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct PayloadSlots {
    pub expected_json: Option<String>,
    pub actual_json: Option<String>,
    pub expected_xml: Option<String>,
    pub actual_xml: Option<String>,
}

/// Parse a boolean flag the way step arguments spell it.
pub fn parse_flag(text: &str) -> bool {
    matches!(text.trim(), "true" | "True" | "TRUE")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags() {
        assert!(parse_flag("true"));
        assert!(parse_flag(" TRUE "));
        assert!(!parse_flag("yes"));
        assert!(!parse_flag("false"));
    }

    #[test]
    fn fresh_state_is_empty() {
        let request = RequestState::default();
        assert!(request.headers.is_empty());
        assert!(request.method.is_none());
        assert!(ResponseState::default().status.is_none());
    }
}
