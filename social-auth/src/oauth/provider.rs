//! Authentication provider trait and the values exchanged around it.

use std::collections::HashMap;

use async_trait::async_trait;
use url::Url;

use super::AuthenticatedClient;
use crate::error::{oauth_error, Error, OAuthErrorKind};

/// Where to send the user, and the `state` that must come back on the callback.
#[derive(Debug, Clone)]
pub struct RedirectToAuthenticateSettings {
    /// Provider URL the user agent is redirected to.
    pub redirect_uri: Url,
    /// CSRF token the caller keeps and later compares against the callback.
    pub state: String,
}

/// Decoded querystring of the provider's redirect back to the callback URL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallbackQuery {
    params: HashMap<String, String>,
}

impl CallbackQuery {
    /// Parse the query of a full callback URL.
    pub fn from_url(url: &Url) -> Self {
        url.query_pairs().into_owned().collect()
    }

    /// Parse a raw querystring, with or without the leading `?`.
    pub fn from_query_str(query: &str) -> Self {
        url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
            .into_owned()
            .collect()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Get a parameter that must be present and non-empty.
    pub fn require(&self, key: &str) -> Result<&str, Error> {
        self.get(key).filter(|v| !v.is_empty()).ok_or_else(|| {
            oauth_error(
                OAuthErrorKind::MissingParameter,
                &format!("Callback is missing the '{}' parameter", key),
            )
        })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }
}

impl FromIterator<(String, String)> for CallbackQuery {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            params: iter.into_iter().collect(),
        }
    }
}

/// Trait for social login providers.
///
/// A login is two calls on two different HTTP requests:
/// - `redirect_to_authenticate` when the user clicks "sign in with …"
/// - `authenticate_client` when the provider redirects back to the callback
#[async_trait]
pub trait AuthenticationProvider: Send + Sync {
    /// Lower-case provider name, e.g. `"google"`.
    fn name(&self) -> &str;

    /// Build the provider redirect and a fresh `state`.
    ///
    /// OAuth 1.0a providers obtain a request token here, and OpenID providers
    /// discover their endpoint, so this may call the network.
    ///
    /// # Arguments
    ///
    /// * `callback_uri` - Where the provider sends the user back to
    async fn redirect_to_authenticate(
        &self,
        callback_uri: &Url,
    ) -> Result<RedirectToAuthenticateSettings, Error>;

    /// Complete the login from the provider's callback.
    ///
    /// The callback `state` is compared with `expected_state` before any
    /// network call is made.
    ///
    /// # Arguments
    ///
    /// * `query` - Querystring received on the callback
    /// * `expected_state` - The `state` issued by `redirect_to_authenticate`
    /// * `callback_uri` - The callback URI used when redirecting
    async fn authenticate_client(
        &self,
        query: &CallbackQuery,
        expected_state: &str,
        callback_uri: &Url,
    ) -> Result<AuthenticatedClient, Error>;
}

/// Append `state` to a callback URI, for flows whose provider only echoes the return URL.
pub(crate) fn callback_with_state(callback_uri: &Url, state: &str) -> Url {
    let mut url = callback_uri.clone();
    url.query_pairs_mut().append_pair("state", state);
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_callback_query_from_url() {
        let url = Url::parse("https://app.test/callback?code=abc%20d&state=xyz").unwrap();
        let query = CallbackQuery::from_url(&url);

        assert_eq!(query.get("code"), Some("abc d"));
        assert_eq!(query.get("state"), Some("xyz"));
        assert_eq!(query.get("missing"), None);
    }

    #[test]
    fn test_callback_query_from_query_str() {
        let query = CallbackQuery::from_query_str("?oauth_token=t&oauth_verifier=v");
        assert_eq!(query.get("oauth_token"), Some("t"));
        assert_eq!(query.get("oauth_verifier"), Some("v"));
    }

    #[test]
    fn test_require_rejects_empty_value() {
        let query = CallbackQuery::from_query_str("code=");
        let err = query.require("code").unwrap_err();
        assert_eq!(
            err.error_kind,
            ErrorKind::OAuth(OAuthErrorKind::MissingParameter)
        );
    }

    #[test]
    fn test_callback_with_state_keeps_existing_query() {
        let callback = Url::parse("https://app.test/cb?provider=twitter").unwrap();
        let url = callback_with_state(&callback, "s1");
        assert_eq!(url.as_str(), "https://app.test/cb?provider=twitter&state=s1");
    }
}
