//! Payload formats and parsing into trees.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::difference::DiffReport;
use crate::error::{DiffError, DiffResult};
use crate::tree_diff::{diff_at_path, TolerantKeys};
use crate::xml::{parse_xml, XmlOptions};

/// Supported payload formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Json,
    Xml,
}

impl Format {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Xml => "xml",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "xml" => Ok(Self::Xml),
            other => Err(format!("unknown format: {other}")),
        }
    }
}

/// Parse `text` in the given format.
pub fn parse_document(text: &str, format: Format, options: &XmlOptions) -> DiffResult<Value> {
    match format {
        Format::Json => serde_json::from_str(text).map_err(|e| DiffError::Parse {
            format: Format::Json,
            message: e.to_string(),
        }),
        Format::Xml => parse_xml(text, options),
    }
}

/// Whether `text` parses as JSON.
pub fn looks_like_json(text: &str) -> bool {
    serde_json::from_str::<serde::de::IgnoredAny>(text).is_ok()
}

/// Cheap check for markup: the first non-blank character opens a tag.
pub fn looks_like_xml(text: &str) -> bool {
    let trimmed = text.trim_start();
    trimmed.starts_with('<') && trimmed.trim_end().ends_with('>')
}

/// Guess the format of `text`, JSON first.
pub fn detect_format(text: &str) -> Option<Format> {
    if looks_like_json(text) {
        Some(Format::Json)
    } else if looks_like_xml(text) {
        Some(Format::Xml)
    } else {
        None
    }
}

/// Parse both payloads and compare them at `scope`.
pub fn compare_documents(
    expected: &str,
    actual: &str,
    format: Format,
    scope: &str,
    tolerant: &TolerantKeys,
    options: &XmlOptions,
) -> DiffResult<DiffReport> {
    let expected = parse_document(expected, format, options)?;
    let actual = parse_document(actual, format, options)?;
    diff_at_path(&expected, &actual, scope, tolerant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn format_names_round_trip() {
        assert_eq!("JSON".parse::<Format>().unwrap(), Format::Json);
        assert_eq!(Format::Xml.to_string(), "xml");
        assert!("yaml".parse::<Format>().is_err());
        assert_eq!(serde_json::to_value(Format::Json).unwrap(), json!("json"));
    }

    #[test]
    fn json_parse_error_names_format() {
        let err = parse_document("{\"a\":", Format::Json, &XmlOptions::default()).unwrap_err();
        assert!(matches!(err, DiffError::Parse { format: Format::Json, .. }));
        assert!(err.to_string().starts_with("json parse error"));
    }

    #[test]
    fn detection() {
        assert_eq!(detect_format(r#"{"a": 1}"#), Some(Format::Json));
        assert_eq!(detect_format("42"), Some(Format::Json));
        assert_eq!(detect_format("  <a>1</a>\n"), Some(Format::Xml));
        assert_eq!(detect_format("hello"), None);
    }

    #[test]
    fn compare_xml_documents() {
        let expected = "<r><a>1</a><b>x</b></r>";
        let actual = "<r><a>1</a><b>y</b></r>";
        let report = compare_documents(
            expected,
            actual,
            Format::Xml,
            "$.r",
            &TolerantKeys::new(),
            &XmlOptions::default(),
        )
        .unwrap();
        assert_eq!(report.len(), 1);
        assert_eq!(report.differences[0].path(), "$.r.b");
    }

    #[test]
    fn compare_json_documents_with_tolerance() {
        let tolerant: TolerantKeys = ["ts"].into_iter().collect();
        let report = compare_documents(
            r#"{"id": 1, "ts": "a"}"#,
            r#"{"id": 1, "ts": "b"}"#,
            Format::Json,
            "$",
            &tolerant,
            &XmlOptions::default(),
        )
        .unwrap();
        assert!(report.is_empty());
    }
}
