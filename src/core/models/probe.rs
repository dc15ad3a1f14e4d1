//! HTTP probe results

use serde::Serialize;

/// Outcome of a single health probe against a public function URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeResult {
    /// HTTP status, `None` when the request never got a response
    pub status: Option<u16>,
    /// Response body (empty on transport failure)
    #[serde(skip)]
    pub body: String,
    /// 200 with a recognized marker in the body
    pub success: bool,
    /// Transport error message, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProbeResult {
    /// Build a result from a response, checking `markers` against the body
    #[must_use]
    pub fn from_response(status: u16, body: String, markers: &[String]) -> Self {
        let success = status == 200 && markers.iter().any(|m| body.contains(m.as_str()));
        Self {
            status: Some(status),
            body,
            success,
            error: None,
        }
    }

    /// Build a result for a request that failed before any response
    #[must_use]
    pub fn transport_failure(error: impl Into<String>) -> Self {
        Self {
            status: None,
            body: String::new(),
            success: false,
            error: Some(error.into()),
        }
    }
}
