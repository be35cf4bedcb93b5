//! Secure credential handling for the judge client.
//!
//! - **No accidental logging**: Credentials cannot appear in Debug/Display output
//! - **Memory safety**: Credentials are zeroed on drop
//! - **Non-empty**: An empty value is treated the same as a missing one
//!
//! ## Usage
//!
//! ```ignore
//! use crate::providers::secrets::ApiCredential;
//!
//! // Load from environment
//! let cred = ApiCredential::from_env("OPENAI_API_KEY", "OpenAI API key")?;
//!
//! // Use in HTTP header (explicit exposure)
//! request.bearer_auth(cred.expose());
//! ```

use secrecy::{ExposeSecret, SecretString};
use std::fmt;

use super::ProviderError;

/// Where a credential was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// Loaded from environment variable
    Environment,
    /// Provided programmatically
    Programmatic,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Environment => write!(f, "environment"),
            CredentialSource::Programmatic => write!(f, "programmatic"),
        }
    }
}

/// A securely-stored, non-empty API credential.
///
/// - Debug and Display show `[REDACTED]`
/// - Zeroed on drop via `secrecy`
/// - Must be explicitly exposed via [`ApiCredential::expose`]
pub struct ApiCredential {
    value: SecretString,
    source: CredentialSource,
    name: &'static str,
}

impl ApiCredential {
    /// Wrap a credential value.
    ///
    /// Fails with [`ProviderError::NotConfigured`] if the value is empty or
    /// whitespace, so no client can be built around a blank key.
    pub fn new(
        value: impl Into<String>,
        source: CredentialSource,
        name: &'static str,
    ) -> Result<Self, ProviderError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ProviderError::NotConfigured(format!("{} is empty", name)));
        }
        Ok(Self {
            value: SecretString::from(value),
            source,
            name,
        })
    }

    /// Load credential from an environment variable.
    pub fn from_env(env_var: &str, name: &'static str) -> Result<Self, ProviderError> {
        let value = std::env::var(env_var).map_err(|_| {
            ProviderError::NotConfigured(format!(
                "{} not set: configure '{}' environment variable",
                name, env_var
            ))
        })?;
        Self::new(value, CredentialSource::Environment, name)
    }

    /// Load credential from an environment variable, treating absence as `None`.
    ///
    /// Unset and empty variables both yield `None`.
    pub fn from_env_optional(env_var: &str, name: &'static str) -> Option<Self> {
        Self::from_env(env_var, name).ok()
    }

    /// Expose the credential value for use in API calls.
    ///
    /// Only call this where the credential is actually needed (setting an
    /// HTTP header). Never store the exposed value.
    pub fn expose(&self) -> &str {
        self.value.expose_secret()
    }

    /// Get the source of this credential.
    pub fn source(&self) -> CredentialSource {
        self.source
    }

    /// Get the human-readable name of this credential.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredential")
            .field("value", &"[REDACTED]")
            .field("source", &self.source)
            .field("name", &self.name)
            .finish()
    }
}

impl fmt::Display for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} from {} [REDACTED]", self.name, self.source)
    }
}
