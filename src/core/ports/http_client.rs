//! HTTP client port
//!
//! Defines the interface for the blocking HTTP calls both procedures make.

use std::time::Duration;

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors raised before an HTTP response is received
#[derive(Debug, Error)]
pub enum HttpError {
    /// Connection, DNS or TLS failure
    #[error("request failed: {0}")]
    Transport(String),

    /// No response within the request timeout
    #[error("request timed out")]
    Timeout,

    /// The request could not be built
    #[error("invalid request: {0}")]
    Client(String),
}

/// HTTP method subset used by this crate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET
    Get,
    /// POST
    Post,
    /// DELETE
    Delete,
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

/// An outbound request
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    /// Method
    pub method: HttpMethod,
    /// Absolute URL including query string
    pub url: String,
    /// Header name/value pairs
    pub headers: Vec<(String, String)>,
    /// JSON body, sent for POST
    pub body: Option<serde_json::Value>,
    /// Per-request timeout, overriding the client default
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
            timeout: None,
        }
    }

    /// A GET request
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    /// A POST request carrying `body` as JSON
    #[must_use]
    pub fn post_json(url: impl Into<String>, body: serde_json::Value) -> Self {
        let mut req = Self::new(HttpMethod::Post, url);
        req.body = Some(body);
        req
    }

    /// A DELETE request
    #[must_use]
    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, url)
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Add several headers
    #[must_use]
    pub fn headers(mut self, headers: &[(String, String)]) -> Self {
        self.headers.extend_from_slice(headers);
        self
    }

    /// Set the per-request timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Look up a header value by case-insensitive name
    #[must_use]
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A received response, whatever its status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code
    pub status: u16,
    /// Body decoded as text
    pub body: String,
}

impl HttpResponse {
    /// Create a response
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Status in the 2xx range
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_str(&self.body)
    }
}

/// Sends blocking HTTP requests
///
/// Any response, including 4xx and 5xx, is `Ok`. Only failures that leave no
/// response are errors.
pub trait HttpClient {
    /// Send `request` and wait for the response
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError>;
}
