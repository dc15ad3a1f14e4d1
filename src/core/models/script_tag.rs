//! Storefront script tag records
//!
//! Script tags are owned by the storefront platform. This crate only lists,
//! creates and deletes them.

use serde::{Deserialize, Serialize};

/// A registered external script reference on the storefront
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptTagRecord {
    /// Platform-assigned identifier
    pub id: u64,
    /// DOM event that triggers loading (normally `onload`)
    #[serde(default)]
    pub event: String,
    /// Source URL of the injected script
    #[serde(default)]
    pub src: String,
    /// Where the script is displayed (`online_store`, `order_status`, `all`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_scope: Option<String>,
    /// Creation timestamp as reported by the platform
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Last update timestamp as reported by the platform
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl ScriptTagRecord {
    /// Whether the source URL contains any of `keywords`, ignoring case
    #[must_use]
    pub fn matches_any(&self, keywords: &[String]) -> bool {
        let src = self.src.to_lowercase();
        keywords.iter().any(|k| !k.is_empty() && src.contains(&k.to_lowercase()))
    }
}

/// Listing envelope: `{"script_tags": [...]}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScriptTagList {
    /// Records in the listing
    #[serde(default)]
    pub script_tags: Vec<ScriptTagRecord>,
}

/// Single-record envelope: `{"script_tag": {...}}`
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptTagEnvelope {
    /// The wrapped record
    pub script_tag: ScriptTagRecord,
}

/// Body of a script tag creation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewScriptTag {
    /// DOM event that triggers loading
    pub event: String,
    /// Source URL to inject
    pub src: String,
}

impl NewScriptTag {
    /// Wrap in the `{"script_tag": ...}` envelope the admin API expects
    #[must_use]
    pub fn to_request_body(&self) -> serde_json::Value {
        serde_json::json!({ "script_tag": self })
    }
}
