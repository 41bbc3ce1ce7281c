//! Provider credentials supplied by the hosting application.

use secrecy::{ExposeSecret, SecretString};

use crate::error::{config_error, ConfigErrorKind, Error};

/// Public/secret API key pair and optional scope list for one provider.
///
/// Validated once on construction and read-only afterwards.
#[derive(Debug, Clone)]
pub struct ProviderParams {
    public_api_key: String,
    secret_api_key: SecretString,
    scopes: Option<Vec<String>>,
}

impl ProviderParams {
    /// Create provider params, rejecting empty keys.
    ///
    /// # Arguments
    ///
    /// * `public_api_key` - Client ID / consumer key issued by the provider
    /// * `secret_api_key` - Client secret / consumer secret issued by the provider
    pub fn new(public_api_key: String, secret_api_key: SecretString) -> Result<Self, Error> {
        if public_api_key.trim().is_empty() {
            return Err(config_error(
                ConfigErrorKind::InvalidProviderParams,
                "A public API key is required",
            ));
        }
        if secret_api_key.expose_secret().trim().is_empty() {
            return Err(config_error(
                ConfigErrorKind::InvalidProviderParams,
                "A secret API key is required",
            ));
        }

        Ok(Self {
            public_api_key,
            secret_api_key,
            scopes: None,
        })
    }

    /// Replace the provider's default scopes with an explicit list.
    ///
    /// Blank entries are dropped; an empty result leaves the defaults in place.
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        let scopes: Vec<String> = scopes
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        self.scopes = if scopes.is_empty() { None } else { Some(scopes) };
        self
    }

    pub fn public_api_key(&self) -> &str {
        &self.public_api_key
    }

    pub fn secret_api_key(&self) -> &SecretString {
        &self.secret_api_key
    }

    pub fn scopes(&self) -> Option<&[String]> {
        self.scopes.as_deref()
    }

    /// Scopes to request: the caller's list when set, otherwise the provider defaults.
    pub fn effective_scopes(&self, defaults: &[&str]) -> Vec<String> {
        match &self.scopes {
            Some(scopes) => scopes.clone(),
            None => defaults.iter().map(|s| s.to_string()).collect(),
        }
    }
}
