//! Access token returned by a provider's token exchange.

use chrono::{DateTime, Duration, Utc};
use secrecy::SecretString;

/// Credential used to call a provider's protected profile API.
///
/// Produced by the token-exchange step and handed to the caller inside the
/// `AuthenticatedClient`; the library never stores it.
#[derive(Debug, Clone)]
pub struct AccessToken {
    /// OAuth 2.0 access token, or OAuth 1.0a `oauth_token`.
    pub public_token: SecretString,
    /// OAuth 1.0a `oauth_token_secret`. Always `None` for OAuth 2.0.
    pub secret_token: Option<SecretString>,
    /// When the token expires, if the provider said so.
    pub expires_on: Option<DateTime<Utc>>,
}

impl AccessToken {
    /// Create a token with no secret and no expiry.
    pub fn new(public_token: String) -> Self {
        Self {
            public_token: SecretString::from(public_token),
            secret_token: None,
            expires_on: None,
        }
    }

    /// Attach an OAuth 1.0a token secret.
    pub fn with_secret(mut self, secret_token: String) -> Self {
        self.secret_token = Some(SecretString::from(secret_token));
        self
    }

    /// Set the expiry from a provider's `expires_in` seconds value.
    ///
    /// A value too large to represent as a date leaves the token without an expiry.
    pub fn expires_in(mut self, seconds: i64) -> Self {
        self.expires_on =
            Duration::try_seconds(seconds).and_then(|ttl| Utc::now().checked_add_signed(ttl));
        self
    }

    /// Check if the token has expired.
    ///
    /// Tokens without an expiry are treated as valid.
    pub fn is_expired(&self) -> bool {
        self.expires_on
            .map(|expires| expires <= Utc::now())
            .unwrap_or(false)
    }
}
