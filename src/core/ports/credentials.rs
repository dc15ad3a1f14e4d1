//! Credential provider port

use thiserror::Error;

/// Errors from acquiring a credential
#[derive(Debug, Error)]
pub enum CredentialError {
    /// No credential was configured or entered
    #[error("no access token available")]
    Missing,

    /// Reading operator input failed
    #[error("failed to read access token: {0}")]
    Prompt(String),
}

/// Supplies the storefront admin access token
pub trait CredentialProvider {
    /// Return a non-empty token or fail
    fn access_token(&self) -> Result<String, CredentialError>;
}
