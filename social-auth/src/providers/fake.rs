//! In-process provider for development and tests.

use async_trait::async_trait;
use url::Url;

use crate::error::{oauth_error, Error, OAuthErrorKind};
use crate::oauth::{
    generate_state, verify_state, AccessToken, AuthenticatedClient, AuthenticationProvider,
    CallbackQuery, RedirectToAuthenticateSettings, UserInformation,
};

const FAKE_CODE: &str = "fake-code";

/// Provider that sends the user straight back to the callback and
/// returns a canned profile, without any network call.
#[derive(Debug, Clone)]
pub struct FakeProvider {
    user_information: UserInformation,
    deny: bool,
}

impl Default for FakeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeProvider {
    pub fn new() -> Self {
        Self {
            user_information: UserInformation {
                id: "fake-user-1".to_string(),
                name: Some("Fake User".to_string()),
                email: Some("fake.user@example.com".to_string()),
                locale: Some("en-US".to_string()),
                user_name: Some("fakeuser".to_string()),
                ..Default::default()
            },
            deny: false,
        }
    }

    pub fn with_user(mut self, user_information: UserInformation) -> Self {
        self.user_information = user_information;
        self
    }

    /// Behave as if the user declined every login.
    pub fn denying(mut self) -> Self {
        self.deny = true;
        self
    }
}

#[async_trait]
impl AuthenticationProvider for FakeProvider {
    fn name(&self) -> &str {
        "fake"
    }

    async fn redirect_to_authenticate(
        &self,
        callback_uri: &Url,
    ) -> Result<RedirectToAuthenticateSettings, Error> {
        let state = generate_state();
        let mut redirect_uri = callback_uri.clone();
        {
            let mut query = redirect_uri.query_pairs_mut();
            if self.deny {
                query.append_pair("error", "access_denied");
            } else {
                query.append_pair("code", FAKE_CODE);
            }
            query.append_pair("state", &state);
        }

        Ok(RedirectToAuthenticateSettings {
            redirect_uri,
            state,
        })
    }

    async fn authenticate_client(
        &self,
        query: &CallbackQuery,
        expected_state: &str,
        _callback_uri: &Url,
    ) -> Result<AuthenticatedClient, Error> {
        verify_state(query, expected_state)?;

        if self.deny || query.contains("error") {
            return Err(oauth_error(
                OAuthErrorKind::AccessDenied,
                "Fake provider denied the login",
            ));
        }
        if query.require("code")? != FAKE_CODE {
            return Err(oauth_error(
                OAuthErrorKind::TokenExchangeFailed,
                "Unknown authorization code",
            ));
        }

        Ok(AuthenticatedClient {
            provider_name: self.name().to_string(),
            access_token: Some(AccessToken::new("fake-access-token".to_string()).expires_in(3600)),
            user_information: self.user_information.clone(),
        })
    }
}
