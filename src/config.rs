//! Configuration management
//!
//! Every identifier the procedures need (project, function, shop, keyword
//! set, command variants, delays) lives here. The built-in defaults target
//! the production project; a TOML file can override any of them.
//!
//! Lookup order when no explicit path is given:
//! 1. `./storefront-ops.toml`
//! 2. `~/.config/storefront-ops/config.toml` (platform config dir)
//! 3. Built-in defaults

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::models::{DeployCommand, default_deploy_commands};

/// Project-local config filename
pub const LOCAL_CONFIG_FILE: &str = "storefront-ops.toml";

/// Directory name under the platform config dir
const APP_DIR: &str = "storefront-ops";

const DEFAULT_PROJECT_ID: &str = "zsmoutzjhqjgjehaituw";
const DEFAULT_SHOP: &str = "testingstoresumeet.myshopify.com";
const EMBED_FUNCTION: &str = "popup-embed-public";

/// Errors from loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("failed to read config {path}: {source}")]
    Read {
        /// Path that was read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for this schema
    #[error("failed to parse config {path}: {source}")]
    Parse {
        /// Path that was parsed
        path: PathBuf,
        /// Underlying TOML error
        #[source]
        source: toml::de::Error,
    },

    /// A value is present but unusable
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpsConfig {
    /// Function deployment settings
    pub deploy: DeployConfig,
    /// Storefront script tag settings
    pub storefront: StorefrontConfig,
    /// Settings for the deploy-then-reconcile driver
    pub fix: FixConfig,
}

/// Function deployment settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    /// Backend project reference
    pub project_id: String,
    /// Edge function to deploy
    pub function_name: String,
    /// Directory commands run in and required files are resolved against
    pub project_dir: PathBuf,
    /// Overrides `https://<project_id>.supabase.co/functions/v1`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub functions_base_url: Option<String>,
    /// Shop passed as `?shop=` when probing
    pub probe_shop: String,
    /// Substrings that identify a healthy response body
    pub markers: Vec<String>,
    /// User-Agent sent by probes
    pub user_agent: String,
    /// Files that must exist before deploying; empty means the defaults
    pub required_files: Vec<PathBuf>,
    /// Per-command timeout in seconds
    pub command_timeout_secs: u64,
    /// Wait between failed attempts in seconds
    pub retry_delay_secs: u64,
    /// Wait after a successful command before verifying, in seconds
    pub propagation_delay_secs: u64,
    /// Probe request timeout in seconds
    pub probe_timeout_secs: u64,
    /// Fallback chain; empty means the built-in four variants
    pub commands: Vec<DeployCommand>,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            project_id: DEFAULT_PROJECT_ID.to_string(),
            function_name: "install-direct".to_string(),
            project_dir: PathBuf::from("."),
            functions_base_url: None,
            probe_shop: DEFAULT_SHOP.to_string(),
            markers: vec!["SmartPop".to_string(), "Installing".to_string(), "OAuth".to_string()],
            user_agent: "Mozilla/5.0 (compatible; SmartPop-Test/1.0)".to_string(),
            required_files: Vec::new(),
            command_timeout_secs: 120,
            retry_delay_secs: 2,
            propagation_delay_secs: 5,
            probe_timeout_secs: 10,
            commands: Vec::new(),
        }
    }
}

impl DeployConfig {
    /// Base URL all functions of the project are served under
    #[must_use]
    pub fn functions_base(&self) -> String {
        self.functions_base_url.as_deref().map_or_else(
            || format!("https://{}.supabase.co/functions/v1", self.project_id),
            |url| url.trim_end_matches('/').to_string(),
        )
    }

    /// Public URL of the configured function
    #[must_use]
    pub fn function_url(&self) -> String {
        format!("{}/{}", self.functions_base(), self.function_name)
    }

    /// URL the health probe requests
    #[must_use]
    pub fn probe_url(&self) -> String {
        format!("{}?shop={}", self.function_url(), self.probe_shop)
    }

    /// Effective fallback chain
    #[must_use]
    pub fn deploy_commands(&self) -> Vec<DeployCommand> {
        if self.commands.is_empty() {
            default_deploy_commands(&self.function_name, &self.project_id)
        } else {
            self.commands.clone()
        }
    }

    /// Effective required files, resolved against `project_dir`
    #[must_use]
    pub fn required_paths(&self) -> Vec<PathBuf> {
        if self.required_files.is_empty() {
            vec![
                self.project_dir
                    .join("supabase")
                    .join("functions")
                    .join(&self.function_name)
                    .join("index.ts"),
                self.project_dir.join("supabase").join("config.toml"),
            ]
        } else {
            self.required_files.iter().map(|f| self.project_dir.join(f)).collect()
        }
    }

    /// Per-command timeout
    #[must_use]
    pub const fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    /// Backoff between attempts
    #[must_use]
    pub const fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    /// Wait before post-deploy verification
    #[must_use]
    pub const fn propagation_delay(&self) -> Duration {
        Duration::from_secs(self.propagation_delay_secs)
    }

    /// Probe request timeout
    #[must_use]
    pub const fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

/// Storefront admin API settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorefrontConfig {
    /// `<shop>.myshopify.com`
    pub shop_domain: String,
    /// Admin API version path segment
    pub api_version: String,
    /// Overrides `https://<shop_domain>/admin/api/<api_version>`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_base_url: Option<String>,
    /// Environment variable holding the access token
    pub token_env: String,
    /// Token value that counts as "not set"
    pub token_placeholder: String,
    /// Case-insensitive substrings marking a script tag for removal
    pub keywords: Vec<String>,
    /// Script URL installed after cleanup, before query parameters
    pub canonical_script_url: String,
    /// Value of the `fix=` query parameter on the new tag
    pub marker: String,
    /// Event the new tag loads on
    pub event: String,
    /// `limit=` for the listing call
    pub page_limit: u32,
    /// Admin request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            shop_domain: DEFAULT_SHOP.to_string(),
            api_version: "2023-10".to_string(),
            admin_base_url: None,
            token_env: "SHOPIFY_ACCESS_TOKEN".to_string(),
            token_placeholder: "YOUR_ACCESS_TOKEN_HERE".to_string(),
            keywords: vec![
                "popup".to_string(),
                "smartpop".to_string(),
                "supabase.co/functions".to_string(),
            ],
            canonical_script_url: format!(
                "https://{DEFAULT_PROJECT_ID}.supabase.co/functions/v1/{EMBED_FUNCTION}"
            ),
            marker: "programmatic".to_string(),
            event: "onload".to_string(),
            page_limit: 250,
            request_timeout_secs: 30,
        }
    }
}

impl StorefrontConfig {
    /// Admin API base URL
    #[must_use]
    pub fn admin_base(&self) -> String {
        self.admin_base_url.as_deref().map_or_else(
            || format!("https://{}/admin/api/{}", self.shop_domain, self.api_version),
            |url| url.trim_end_matches('/').to_string(),
        )
    }

    /// Listing endpoint
    #[must_use]
    pub fn list_url(&self) -> String {
        format!("{}/script_tags.json?limit={}", self.admin_base(), self.page_limit)
    }

    /// Creation endpoint
    #[must_use]
    pub fn create_url(&self) -> String {
        format!("{}/script_tags.json", self.admin_base())
    }

    /// Deletion endpoint for one record
    #[must_use]
    pub fn delete_url(&self, id: u64) -> String {
        format!("{}/script_tags/{id}.json", self.admin_base())
    }

    /// Source URL for the replacement tag, stamped with `timestamp`
    #[must_use]
    pub fn canonical_src(&self, timestamp: i64) -> String {
        format!(
            "{}?shop={}&fix={}&v={timestamp}",
            self.canonical_script_url, self.shop_domain, self.marker
        )
    }

    /// Where an operator can create or look up an access token
    #[must_use]
    pub fn token_help_url(&self) -> String {
        format!("https://{}/admin/settings/apps", self.shop_domain)
    }

    /// Admin request timeout
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Deploy step run by the fix driver before reconciling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixConfig {
    /// Working directory, relative to `deploy.project_dir`
    pub working_dir: PathBuf,
    /// Commands tried in order
    pub commands: Vec<DeployCommand>,
}

impl Default for FixConfig {
    fn default() -> Self {
        Self {
            working_dir: PathBuf::from("supabase"),
            commands: vec![DeployCommand::new(
                "npx",
                ["supabase", "functions", "deploy", EMBED_FUNCTION, "--no-verify-jwt"],
                "Deploying latest embed function",
            )],
        }
    }
}

impl OpsConfig {
    /// Platform config file path (`~/.config/storefront-ops/config.toml` on Linux)
    #[must_use]
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
    }

    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Parse TOML without validating
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Resolve the config to use
    ///
    /// An explicit path must exist. Otherwise the local file, then the
    /// platform file, then the defaults. Returns the path actually loaded.
    pub fn discover(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>), ConfigError> {
        if let Some(path) = explicit {
            return Ok((Self::load(path)?, Some(path.to_path_buf())));
        }

        let candidates =
            std::iter::once(PathBuf::from(LOCAL_CONFIG_FILE)).chain(Self::global_config_path());
        for candidate in candidates {
            if candidate.is_file() {
                let config = Self::load(&candidate)?;
                return Ok((config, Some(candidate)));
            }
        }

        Ok((Self::default(), None))
    }

    /// Reject values that would make a procedure meaningless
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("deploy.project_id", &self.deploy.project_id),
            ("deploy.function_name", &self.deploy.function_name),
            ("storefront.shop_domain", &self.storefront.shop_domain),
            ("storefront.canonical_script_url", &self.storefront.canonical_script_url),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{name} must not be empty")));
            }
        }

        if let Some(cmd) = self
            .deploy
            .commands
            .iter()
            .chain(self.fix.commands.iter())
            .find(|c| c.program.trim().is_empty())
        {
            return Err(ConfigError::Invalid(format!(
                "command '{}' has an empty program",
                cmd.description
            )));
        }

        Ok(())
    }
}
