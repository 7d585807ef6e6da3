//! Request and response envelopes exchanged between the host runtime,
//! the interception engine, and the stores.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// How the host issued the request. Decides what a cross-origin
/// response looks like to the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum RequestMode {
    #[default]
    Cors,
    NoCors,
    SameOrigin,
    Navigate,
}

/// A request observed by the interception layer.
///
/// `url` is kept exactly as the host presented it (relative or absolute);
/// classification runs on this raw string, store keys on its canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct InterceptedRequest {
    /// HTTP method (default: GET).
    #[serde(default = "default_method")]
    pub method: String,

    /// Request URL.
    pub url: String,

    /// Request headers. Names are matched case-insensitively.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Request mode (default: cors).
    #[serde(default)]
    pub mode: RequestMode,
}

fn default_method() -> String {
    "GET".into()
}

impl InterceptedRequest {
    /// A plain GET request for `url`.
    pub fn get(url: impl Into<String>) -> Self {
        Self { method: default_method(), url: url.into(), headers: BTreeMap::new(), mode: RequestMode::default() }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_mode(mut self, mode: RequestMode) -> Self {
        self.mode = mode;
        self
    }

    /// Header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Only GET requests are intercepted and stored.
    pub fn is_retrieval_safe(&self) -> bool {
        self.method.eq_ignore_ascii_case("GET")
    }

    /// Whether the request's `Accept` header asks for an HTML document.
    pub fn accepts_document(&self) -> bool {
        self.header("accept").is_some_and(|accept| accept.contains("text/html"))
    }
}

/// Where a response came from, as far as the requester can tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    /// Same-origin network response.
    Basic,
    /// Cross-origin response the origin allowed us to read.
    Cors,
    /// Cross-origin response with hidden status, headers and body.
    Opaque,
    /// Constructed locally rather than fetched.
    Synthetic,
}

impl ResponseKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ResponseKind::Basic => "basic",
            ResponseKind::Cors => "cors",
            ResponseKind::Opaque => "opaque",
            ResponseKind::Synthetic => "synthetic",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "basic" => Some(ResponseKind::Basic),
            "cors" => Some(ResponseKind::Cors),
            "opaque" => Some(ResponseKind::Opaque),
            "synthetic" => Some(ResponseKind::Synthetic),
            _ => None,
        }
    }
}

/// A response as fetched or as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseEnvelope {
    /// Final URL of the response (empty for synthetic responses).
    pub url: String,
    /// HTTP status. Opaque responses report 0.
    pub status: u16,
    pub status_text: String,
    pub kind: ResponseKind,
    /// Response headers with lowercased names.
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

impl ResponseEnvelope {
    /// An opaque response: the body passes through, nothing else is visible.
    pub fn opaque(url: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            url: url.into(),
            status: 0,
            status_text: String::new(),
            kind: ResponseKind::Opaque,
            headers: BTreeMap::new(),
            body,
        }
    }

    /// A locally constructed response.
    pub fn synthetic(status: u16, status_text: &str, content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("content-type".to_string(), content_type.to_string());
        Self {
            url: String::new(),
            status,
            status_text: status_text.to_string(),
            kind: ResponseKind::Synthetic,
            headers,
            body: body.into(),
        }
    }

    /// Status in the 2xx range.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_opaque(&self) -> bool {
        self.kind == ResponseKind::Opaque
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }
}
