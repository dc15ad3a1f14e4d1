//! Access token acquisition
//!
//! The token comes from an environment variable. When that is unset, empty
//! or still the placeholder, an operator at a terminal is prompted for it.

use std::io::IsTerminal;

use dialoguer::Password;

use crate::config::StorefrontConfig;
use crate::core::ports::{CredentialError, CredentialProvider};

/// Environment variable with an interactive fallback
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    var: String,
    placeholder: String,
    help_url: String,
    interactive: bool,
}

impl EnvCredentials {
    /// Read from `config.token_env`, prompting when `interactive` and stdin is a TTY
    #[must_use]
    pub fn from_config(config: &StorefrontConfig, interactive: bool) -> Self {
        Self {
            var: config.token_env.clone(),
            placeholder: config.token_placeholder.clone(),
            help_url: config.token_help_url(),
            interactive,
        }
    }

    /// The environment value, if it is a usable token
    #[must_use]
    pub fn env_token(&self) -> Option<String> {
        std::env::var(&self.var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty() && *v != self.placeholder)
    }

    fn prompt(&self) -> Result<String, CredentialError> {
        eprintln!("🔑 Need Shopify Admin API access token");
        eprintln!("1. Go to: {}", self.help_url);
        eprintln!("2. Create a private app or get existing token");
        eprintln!("3. Copy the access token");

        let token = Password::new()
            .with_prompt("Enter your Shopify access token")
            .allow_empty_password(true)
            .interact()
            .map_err(|e| CredentialError::Prompt(e.to_string()))?;

        let token = token.trim().to_string();
        if token.is_empty() {
            Err(CredentialError::Missing)
        } else {
            Ok(token)
        }
    }
}

impl CredentialProvider for EnvCredentials {
    fn access_token(&self) -> Result<String, CredentialError> {
        if let Some(token) = self.env_token() {
            return Ok(token);
        }

        log::debug!("{} not set or placeholder", self.var);
        if self.interactive && std::io::stdin().is_terminal() {
            self.prompt()
        } else {
            Err(CredentialError::Missing)
        }
    }
}
