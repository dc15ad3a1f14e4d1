//! Script tag reconciliation service
//!
//! List, filter, delete, then install exactly one canonical tag. A failed
//! listing aborts; failed deletions are recorded and skipped.

use serde::Serialize;
use thiserror::Error;

use crate::config::StorefrontConfig;
use crate::core::models::{NewScriptTag, ScriptTagEnvelope, ScriptTagList, ScriptTagRecord};
use crate::core::ports::{
    Clock, CredentialError, CredentialProvider, HttpClient, HttpError, HttpRequest,
};

const TOKEN_HEADER: &str = "X-Shopify-Access-Token";

/// Errors that end a reconciliation
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// No access token could be obtained
    #[error("no access token provided: {0}")]
    Credential(#[from] CredentialError),

    /// The listing call answered with a non-200 status
    #[error("failed to fetch script tags: HTTP {status}")]
    ListFailed {
        /// Status returned
        status: u16,
        /// Raw response body
        body: String,
    },

    /// The listing call got no response
    #[error("failed to fetch script tags: {0}")]
    ListTransport(#[source] HttpError),

    /// The listing body was not the expected JSON
    #[error("unexpected script tag listing: {0}")]
    ListDecode(#[source] serde_json::Error),

    /// The creation call answered with a non-2xx status
    #[error("failed to install new script: HTTP {status}")]
    CreateFailed {
        /// Status returned
        status: u16,
        /// Raw response body
        body: String,
        /// Tags deleted before the creation was attempted
        deleted: usize,
    },

    /// The creation call got no response
    #[error("failed to install new script: {source}")]
    CreateTransport {
        /// Underlying transport error
        #[source]
        source: HttpError,
        /// Tags deleted before the creation was attempted
        deleted: usize,
    },
}

impl ReconcileError {
    /// Raw response body, for errors that carry one
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::ListFailed { body, .. } | Self::CreateFailed { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Number of tags deleted before the error
    #[must_use]
    pub const fn deleted_before_failure(&self) -> usize {
        match self {
            Self::CreateFailed { deleted, .. } | Self::CreateTransport { deleted, .. } => *deleted,
            _ => 0,
        }
    }

    /// Whether the store was changed before the error
    #[must_use]
    pub const fn mutated_store(&self) -> bool {
        self.deleted_before_failure() > 0
    }
}

/// Outcome of deleting one matched tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletionResult {
    /// Record id
    pub id: u64,
    /// Record source URL
    pub src: String,
    /// 200 or 204 was returned
    pub deleted: bool,
    /// Status returned, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Transport error, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Full account of a successful reconciliation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Shop that was reconciled
    pub shop_domain: String,
    /// Number of tags in the listing
    pub listed: usize,
    /// Tags selected for deletion
    pub matched: Vec<ScriptTagRecord>,
    /// One entry per matched tag, in order
    pub deletions: Vec<DeletionResult>,
    /// Source URL that was installed
    pub installed_src: String,
    /// Record returned by the platform, when it could be decoded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<ScriptTagRecord>,
}

impl ReconcileReport {
    /// Number of tags actually deleted
    #[must_use]
    pub fn deleted_count(&self) -> usize {
        self.deletions.iter().filter(|d| d.deleted).count()
    }

    /// Deletions that did not go through
    #[must_use]
    pub fn failed_deletions(&self) -> impl Iterator<Item = &DeletionResult> {
        self.deletions.iter().filter(|d| !d.deleted)
    }
}

/// Tags whose source URL contains any keyword, ignoring case
#[must_use]
pub fn select_matching(tags: &[ScriptTagRecord], keywords: &[String]) -> Vec<ScriptTagRecord> {
    tags.iter().filter(|t| t.matches_any(keywords)).cloned().collect()
}

/// Removes stale popup tags and installs the canonical one
#[derive(Debug)]
pub struct ScriptTagReconciler<'a, H, P, C> {
    config: &'a StorefrontConfig,
    http: &'a H,
    credentials: &'a P,
    clock: &'a C,
}

impl<'a, H, P, C> ScriptTagReconciler<'a, H, P, C>
where
    H: HttpClient,
    P: CredentialProvider,
    C: Clock,
{
    /// Wire up a reconciler against the given ports
    #[must_use]
    pub const fn new(
        config: &'a StorefrontConfig,
        http: &'a H,
        credentials: &'a P,
        clock: &'a C,
    ) -> Self {
        Self {
            config,
            http,
            credentials,
            clock,
        }
    }

    fn admin_headers(token: &str) -> Vec<(String, String)> {
        vec![
            (TOKEN_HEADER.to_string(), token.to_string()),
            ("Content-Type".to_string(), "application/json".to_string()),
        ]
    }

    fn list(&self, headers: &[(String, String)]) -> Result<Vec<ScriptTagRecord>, ReconcileError> {
        log::info!("📋 Step 1: Fetching current script tags...");
        let request = HttpRequest::get(self.config.list_url())
            .headers(headers)
            .timeout(self.config.request_timeout());
        let response = self.http.send(&request).map_err(|e| {
            log::error!("❌ Failed to fetch script tags: {e}");
            ReconcileError::ListTransport(e)
        })?;

        if response.status != 200 {
            log::error!("❌ Failed to fetch script tags: {}", response.status);
            log::error!("Response: {}", response.body);
            return Err(ReconcileError::ListFailed {
                status: response.status,
                body: response.body,
            });
        }

        let list: ScriptTagList = response.json().map_err(ReconcileError::ListDecode)?;
        log::info!("Found {} total script tags", list.script_tags.len());
        Ok(list.script_tags)
    }

    fn delete(&self, headers: &[(String, String)], tag: &ScriptTagRecord) -> DeletionResult {
        log::info!("Deleting script ID: {}", tag.id);
        let request = HttpRequest::delete(self.config.delete_url(tag.id))
            .headers(headers)
            .timeout(self.config.request_timeout());

        let mut result = DeletionResult {
            id: tag.id,
            src: tag.src.clone(),
            deleted: false,
            status: None,
            error: None,
        };

        match self.http.send(&request) {
            Ok(response) => {
                result.status = Some(response.status);
                result.deleted = matches!(response.status, 200 | 204);
                if result.deleted {
                    log::info!("✅ Deleted script ID: {}", tag.id);
                } else {
                    log::error!(
                        "❌ Failed to delete script ID: {} - {}",
                        tag.id,
                        response.status
                    );
                }
            },
            Err(e) => {
                log::error!("❌ Failed to delete script ID: {} - {e}", tag.id);
                result.error = Some(e.to_string());
            },
        }

        result
    }

    fn create(
        &self,
        headers: &[(String, String)],
        src: &str,
        deleted: usize,
    ) -> Result<Option<ScriptTagRecord>, ReconcileError> {
        let body = NewScriptTag {
            event: self.config.event.clone(),
            src: src.to_string(),
        }
        .to_request_body();
        let request = HttpRequest::post_json(self.config.create_url(), body)
            .headers(headers)
            .timeout(self.config.request_timeout());

        let response = self.http.send(&request).map_err(|e| {
            log::error!("❌ Failed to install new script: {e}");
            ReconcileError::CreateTransport { source: e, deleted }
        })?;

        if !response.is_success() {
            log::error!("❌ Failed to install new script: {}", response.status);
            log::error!("Response: {}", response.body);
            return Err(ReconcileError::CreateFailed {
                status: response.status,
                body: response.body,
                deleted,
            });
        }

        match response.json::<ScriptTagEnvelope>() {
            Ok(envelope) => Ok(Some(envelope.script_tag)),
            Err(e) => {
                log::warn!("⚠️  Script installed but response was not understood: {e}");
                Ok(None)
            },
        }
    }

    /// Run the whole procedure
    pub fn run(&self) -> Result<ReconcileReport, ReconcileError> {
        let token = self.credentials.access_token().inspect_err(|e| {
            log::error!("❌ No access token provided. Cannot continue. ({e})");
        })?;
        let headers = Self::admin_headers(&token);

        let tags = self.list(&headers)?;

        let matched = select_matching(&tags, &self.config.keywords);
        for tag in &matched {
            log::info!("  - Found popup script: {}", tag.src);
        }
        log::info!("🗑️ Step 2: Found {} popup scripts to remove", matched.len());

        let deletions: Vec<_> = matched.iter().map(|tag| self.delete(&headers, tag)).collect();

        log::info!("🧹 Step 3: Installing ONE clean script...");
        let installed_src = self.config.canonical_src(self.clock.unix_timestamp());
        let deleted = deletions.iter().filter(|d| d.deleted).count();
        let created = self.create(&headers, &installed_src, deleted)?;

        log::info!("🎉 Script tags reconciled");
        if let Some(tag) = &created {
            log::info!("✅ New Script ID: {}", tag.id);
            log::info!("✅ Script URL: {}", tag.src);
        }

        Ok(ReconcileReport {
            shop_domain: self.config.shop_domain.clone(),
            listed: tags.len(),
            matched,
            deletions,
            installed_src,
            created,
        })
    }
}
