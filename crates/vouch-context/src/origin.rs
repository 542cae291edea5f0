//! Key namespaces for context values.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Where a context value came from.
///
/// Every origin owns the keys `<Origin>` (a scalar payload or a single
/// setting) and `<Origin>_<path>` (one field of a structured payload).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Origin {
    RequestHeaders,
    RequestParams,
    RequestForm,
    RequestMethod,
    RequestData,
    RequestFailOnStatusCode,
    RequestIgnoreHttpsErrors,
    RequestMaxRedirects,
    RequestMaxRetries,
    RequestTimeout,
    ResponseData,
    ResponseBody,
    ResponseContentType,
    ResponseHeaders,
    ResponsePath,
    ResponseStatus,
    ExpectedJson,
    ActualJson,
    ExpectedXml,
    ActualXml,
    TolerantKeys,
}

const ALL: [Origin; 21] = [
    Origin::RequestHeaders,
    Origin::RequestParams,
    Origin::RequestForm,
    Origin::RequestMethod,
    Origin::RequestData,
    Origin::RequestFailOnStatusCode,
    Origin::RequestIgnoreHttpsErrors,
    Origin::RequestMaxRedirects,
    Origin::RequestMaxRetries,
    Origin::RequestTimeout,
    Origin::ResponseData,
    Origin::ResponseBody,
    Origin::ResponseContentType,
    Origin::ResponseHeaders,
    Origin::ResponsePath,
    Origin::ResponseStatus,
    Origin::ExpectedJson,
    Origin::ActualJson,
    Origin::ExpectedXml,
    Origin::ActualXml,
    Origin::TolerantKeys,
];

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RequestHeaders => "RequestHeaders",
            Self::RequestParams => "RequestParams",
            Self::RequestForm => "RequestForm",
            Self::RequestMethod => "RequestMethod",
            Self::RequestData => "RequestData",
            Self::RequestFailOnStatusCode => "RequestFailOnStatusCode",
            Self::RequestIgnoreHttpsErrors => "RequestIgnoreHTTPSErrors",
            Self::RequestMaxRedirects => "RequestMaxRedirects",
            Self::RequestMaxRetries => "RequestMaxRetries",
            Self::RequestTimeout => "RequestTimeout",
            Self::ResponseData => "ResponseData",
            Self::ResponseBody => "ResponseBody",
            Self::ResponseContentType => "ResponseContentType",
            Self::ResponseHeaders => "ResponseHeaders",
            Self::ResponsePath => "ResponsePath",
            Self::ResponseStatus => "ResponseStatus",
            Self::ExpectedJson => "ExpectedJson",
            Self::ActualJson => "ActualJson",
            Self::ExpectedXml => "ExpectedXml",
            Self::ActualXml => "ActualXml",
            Self::TolerantKeys => "TolerantKeys",
        }
    }

    /// The context key for `path` under this origin.
    ///
    /// An empty path names the origin itself.
    pub fn key(&self, path: &str) -> String {
        if path.is_empty() {
            self.as_str().to_string()
        } else {
            format!("{}_{path}", self.as_str())
        }
    }

    /// Every known origin.
    pub fn all() -> &'static [Origin] {
        &ALL
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Origin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL.iter()
            .copied()
            .find(|origin| origin.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown origin: {s}"))
    }
}
