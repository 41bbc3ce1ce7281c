//! Generic OAuth 1.0a provider (Twitter style three-legged flow).

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use secrecy::ExposeSecret;
use tracing::{debug, info};
use url::Url;

use super::signature::{generate_nonce, timestamp, OAuthParameters};
use crate::error::{oauth_error, oauth_error_from, Error, OAuthErrorKind};
use crate::http::{parse_form, read_success_body, HttpClient};
use crate::oauth::{
    callback_with_state, generate_state, verify_state, AccessToken, AuthenticatedClient,
    AuthenticationProvider, CallbackQuery, ProfileMapper, RedirectToAuthenticateSettings,
    UserInformation,
};
use crate::params::ProviderParams;

/// Endpoints of an OAuth 1.0a provider.
#[derive(Debug, Clone)]
pub struct OAuth1Endpoints {
    pub request_token: String,
    pub authorize: String,
    pub access_token: String,
    /// Protected resource returning the signed-in user's profile.
    pub verify_credentials: String,
}

/// Everything that differs between OAuth 1.0a providers.
#[derive(Debug, Clone)]
pub struct OAuth1Descriptor {
    pub name: String,
    pub endpoints: OAuth1Endpoints,
    pub map_user: ProfileMapper,
}

/// Request or access token pair returned by the token endpoints.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub token: String,
    pub token_secret: String,
}

/// OAuth 1.0a provider driven by a descriptor.
///
/// Handles the three signed calls of the flow:
/// - Request token retrieval before the redirect
/// - Access token exchange with the callback's verifier
/// - Profile retrieval as a protected resource request
pub struct OAuth10Provider {
    descriptor: OAuth1Descriptor,
    params: ProviderParams,
    http_client: HttpClient,
}

impl OAuth10Provider {
    /// Create a new OAuth 1.0a provider.
    ///
    /// # Arguments
    ///
    /// * `descriptor` - Provider endpoints and profile mapping
    /// * `params` - Consumer key and secret
    /// * `http_client` - Client used for every provider call
    pub fn new(descriptor: OAuth1Descriptor, params: ProviderParams, http_client: HttpClient) -> Self {
        Self {
            descriptor,
            params,
            http_client,
        }
    }

    pub fn descriptor(&self) -> &OAuth1Descriptor {
        &self.descriptor
    }

    /// Obtain a request token for a login that will return to `callback_uri`.
    pub async fn retrieve_request_token(&self, callback_uri: &Url) -> Result<TokenPair, Error> {
        let url = Url::parse(&self.descriptor.endpoints.request_token)?;
        let params = OAuthParameters::new(self.params.public_api_key(), &generate_nonce(), timestamp())
            .with_callback(callback_uri.as_str());

        debug!("Retrieving {} request token", self.descriptor.name);

        let body = self
            .signed_post(&url, &params)
            .await
            .map_err(|e| oauth_error_from(OAuthErrorKind::RequestTokenFailed, e))?;
        let form = parse_form(&body);

        if form
            .get("oauth_callback_confirmed")
            .is_some_and(|confirmed| confirmed != "true")
        {
            return Err(oauth_error(
                OAuthErrorKind::RequestTokenFailed,
                "The provider did not confirm the callback URL",
            ));
        }

        Self::token_pair(&form, "request token")
    }

    /// Provider page the user is sent to with the request token.
    pub fn authorize_url(&self, request_token: &str) -> Result<Url, Error> {
        let mut url = Url::parse(&self.descriptor.endpoints.authorize)?;
        url.query_pairs_mut().append_pair("oauth_token", request_token);
        Ok(url)
    }

    /// Exchange the authorized request token and verifier for an access token.
    pub async fn retrieve_access_token(
        &self,
        request_token: &str,
        verifier: &str,
    ) -> Result<AccessToken, Error> {
        let url = Url::parse(&self.descriptor.endpoints.access_token)?;
        let params = OAuthParameters::new(self.params.public_api_key(), &generate_nonce(), timestamp())
            .with_token(request_token)
            .with_parameter("oauth_verifier", verifier);

        debug!("Retrieving {} access token", self.descriptor.name);

        let body = self
            .signed_post(&url, &params)
            .await
            .map_err(|e| oauth_error_from(OAuthErrorKind::TokenExchangeFailed, e))?;
        let pair = Self::token_pair(&parse_form(&body), "access token")?;

        Ok(AccessToken::new(pair.token).with_secret(pair.token_secret))
    }

    /// Fetch the user's profile with the access token.
    pub async fn verify_credentials(&self, access_token: &AccessToken) -> Result<UserInformation, Error> {
        let url = Url::parse(&self.descriptor.endpoints.verify_credentials)?;
        let params = OAuthParameters::new(self.params.public_api_key(), &generate_nonce(), timestamp())
            .with_token(access_token.public_token.expose_secret());
        let token_secret = access_token
            .secret_token
            .as_ref()
            .map(|secret| secret.expose_secret().as_str());
        let header = params.authorization_header(
            "GET",
            &url,
            self.params.secret_api_key().expose_secret(),
            token_secret,
        )?;

        let response = self
            .http_client
            .get(url.as_str())
            .header(AUTHORIZATION, header)
            .send()
            .await?;
        let body = read_success_body(response, &format!("{} verify credentials", self.descriptor.name))
            .await
            .map_err(|e| oauth_error_from(OAuthErrorKind::UserInfoFailed, e))?;

        let profile: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| oauth_error_from(OAuthErrorKind::InvalidResponse, e))?;
        (self.descriptor.map_user)(&profile)
    }

    // The request token secret is not carried across the redirect, so token
    // endpoint calls are signed with the consumer secret alone.
    async fn signed_post(&self, url: &Url, params: &OAuthParameters) -> Result<String, Error> {
        let header = params.authorization_header(
            "POST",
            url,
            self.params.secret_api_key().expose_secret(),
            None,
        )?;

        let response = self
            .http_client
            .post(url.as_str())
            .header(AUTHORIZATION, header)
            .send()
            .await?;

        read_success_body(response, &format!("{} {}", self.descriptor.name, url.path())).await
    }

    fn token_pair(form: &HashMap<String, String>, what: &str) -> Result<TokenPair, Error> {
        let field = |key: &str| {
            form.get(key)
                .filter(|value| !value.is_empty())
                .cloned()
                .ok_or_else(|| {
                    oauth_error(
                        OAuthErrorKind::MissingField,
                        &format!("The {} response has no '{}'", what, key),
                    )
                })
        };

        Ok(TokenPair {
            token: field("oauth_token")?,
            token_secret: field("oauth_token_secret")?,
        })
    }
}

#[async_trait]
impl AuthenticationProvider for OAuth10Provider {
    fn name(&self) -> &str {
        &self.descriptor.name
    }

    async fn redirect_to_authenticate(
        &self,
        callback_uri: &Url,
    ) -> Result<RedirectToAuthenticateSettings, Error> {
        let state = generate_state();
        let request_token = self
            .retrieve_request_token(&callback_with_state(callback_uri, &state))
            .await?;

        Ok(RedirectToAuthenticateSettings {
            redirect_uri: self.authorize_url(&request_token.token)?,
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

        if query.contains("denied") {
            return Err(oauth_error(
                OAuthErrorKind::AccessDenied,
                &format!("The user denied access to {}", self.descriptor.name),
            ));
        }

        let request_token = query.require("oauth_token")?;
        let verifier = query.require("oauth_verifier")?;

        let access_token = self.retrieve_access_token(request_token, verifier).await?;
        let user_information = self.verify_credentials(&access_token).await?;

        info!(
            "Authenticated {} user {}",
            self.descriptor.name, user_information.id
        );

        Ok(AuthenticatedClient {
            provider_name: self.descriptor.name.clone(),
            access_token: Some(access_token),
            user_information,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, HttpErrorKind};
    use crate::http::HttpClientBuilder;
    use mockito::{Matcher, Server, ServerGuard};
    use secrecy::SecretString;

    fn map_user(profile: &serde_json::Value) -> Result<UserInformation, Error> {
        Ok(UserInformation {
            id: profile["id_str"].as_str().unwrap_or_default().to_string(),
            user_name: profile["screen_name"].as_str().map(str::to_string),
            ..Default::default()
        })
    }

    fn provider(server: &ServerGuard) -> OAuth10Provider {
        let descriptor = OAuth1Descriptor {
            name: "twitter".to_string(),
            endpoints: OAuth1Endpoints {
                request_token: format!("{}/oauth/request_token", server.url()),
                authorize: format!("{}/oauth/authenticate", server.url()),
                access_token: format!("{}/oauth/access_token", server.url()),
                verify_credentials: format!("{}/1.1/account/verify_credentials.json", server.url()),
            },
            map_user,
        };
        let params = ProviderParams::new(
            "consumer-key".to_string(),
            SecretString::from("consumer-secret".to_string()),
        )
        .unwrap();

        OAuth10Provider::new(descriptor, params, HttpClientBuilder::new().build().unwrap())
    }

    fn callback() -> Url {
        Url::parse("https://app.test/authentication/callback").unwrap()
    }

    #[tokio::test]
    async fn test_redirect_retrieves_request_token() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/oauth/request_token")
            .match_header(
                "authorization",
                Matcher::Regex(r#"^OAuth oauth_callback="https%3A%2F%2Fapp\.test.*oauth_consumer_key="consumer-key".*oauth_signature=""#.to_string()),
            )
            .with_status(200)
            .with_body("oauth_token=req-token&oauth_token_secret=req-secret&oauth_callback_confirmed=true")
            .create_async()
            .await;

        let settings = provider(&server)
            .redirect_to_authenticate(&callback())
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(settings.state.len(), 64);
        assert_eq!(
            settings.redirect_uri.as_str(),
            format!("{}/oauth/authenticate?oauth_token=req-token", server.url())
        );
    }

    #[tokio::test]
    async fn test_request_token_missing_secret_fails() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/oauth/request_token")
            .with_status(200)
            .with_body("oauth_token=req-token")
            .create_async()
            .await;

        let err = provider(&server)
            .redirect_to_authenticate(&callback())
            .await
            .unwrap_err();

        assert_eq!(err.error_kind, ErrorKind::OAuth(OAuthErrorKind::MissingField));
    }

    #[tokio::test]
    async fn test_unconfirmed_callback_fails() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/oauth/request_token")
            .with_status(200)
            .with_body("oauth_token=req-token&oauth_token_secret=req-secret&oauth_callback_confirmed=false")
            .create_async()
            .await;

        let err = provider(&server)
            .redirect_to_authenticate(&callback())
            .await
            .unwrap_err();

        assert_eq!(
            err.error_kind,
            ErrorKind::OAuth(OAuthErrorKind::RequestTokenFailed)
        );
        assert!(err.message_chain().contains("did not confirm the callback URL"));
    }

    #[tokio::test]
    async fn test_request_token_non_success_status_fails() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/oauth/request_token")
            .with_status(401)
            .with_body("Failed to validate oauth signature and token")
            .create_async()
            .await;

        let err = provider(&server)
            .redirect_to_authenticate(&callback())
            .await
            .unwrap_err();

        assert_eq!(
            err.error_kind,
            ErrorKind::OAuth(OAuthErrorKind::RequestTokenFailed)
        );
        assert!(err.message_chain().contains("Status(401)"));
    }

    #[tokio::test]
    async fn test_authenticate_client_full_flow() {
        let mut server = Server::new_async().await;
        let access_mock = server
            .mock("POST", "/oauth/access_token")
            .match_header(
                "authorization",
                Matcher::Regex(r#"oauth_token="req-token".*oauth_verifier="verifier-1""#.to_string()),
            )
            .with_status(200)
            .with_body("oauth_token=access-token&oauth_token_secret=access-secret&user_id=12&screen_name=jack")
            .create_async()
            .await;
        let profile_mock = server
            .mock("GET", "/1.1/account/verify_credentials.json")
            .match_header(
                "authorization",
                Matcher::Regex(r#"oauth_token="access-token""#.to_string()),
            )
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id_str":"12","screen_name":"jack"}"#)
            .create_async()
            .await;

        let query = CallbackQuery::from_query_str("state=s1&oauth_token=req-token&oauth_verifier=verifier-1");
        let client = provider(&server)
            .authenticate_client(&query, "s1", &callback())
            .await
            .unwrap();

        access_mock.assert_async().await;
        profile_mock.assert_async().await;
        assert_eq!(client.provider_name, "twitter");
        assert_eq!(client.user_information.id, "12");
        assert_eq!(client.user_information.user_name.as_deref(), Some("jack"));
        let token = client.access_token.unwrap();
        assert_eq!(token.public_token.expose_secret(), "access-token");
        assert_eq!(
            token.secret_token.map(|s| s.expose_secret().clone()),
            Some("access-secret".to_string())
        );
    }

    #[tokio::test]
    async fn test_denied_callback_fails_without_network() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let query = CallbackQuery::from_query_str("state=s1&denied=req-token");
        let err = provider(&server)
            .authenticate_client(&query, "s1", &callback())
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert_eq!(err.error_kind, ErrorKind::OAuth(OAuthErrorKind::AccessDenied));
    }

    #[tokio::test]
    async fn test_mismatched_state_fails_without_network() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let query = CallbackQuery::from_query_str("state=forged&oauth_token=t&oauth_verifier=v");
        let err = provider(&server)
            .authenticate_client(&query, "s1", &callback())
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert_eq!(err.error_kind, ErrorKind::OAuth(OAuthErrorKind::InvalidState));
    }

    #[tokio::test]
    async fn test_access_token_missing_fields_skips_profile_call() {
        let mut server = Server::new_async().await;
        let _access_mock = server
            .mock("POST", "/oauth/access_token")
            .with_status(200)
            .with_body("oauth_token=access-token")
            .create_async()
            .await;
        let profile_mock = server
            .mock("GET", "/1.1/account/verify_credentials.json")
            .expect(0)
            .create_async()
            .await;

        let query = CallbackQuery::from_query_str("state=s1&oauth_token=t&oauth_verifier=v");
        let err = provider(&server)
            .authenticate_client(&query, "s1", &callback())
            .await
            .unwrap_err();

        profile_mock.assert_async().await;
        assert_eq!(err.error_kind, ErrorKind::OAuth(OAuthErrorKind::MissingField));
    }

    #[tokio::test]
    async fn test_verify_credentials_error_status() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/1.1/account/verify_credentials.json")
            .with_status(500)
            .create_async()
            .await;

        let token = AccessToken::new("a".to_string()).with_secret("b".to_string());
        let err = provider(&server).verify_credentials(&token).await.unwrap_err();

        assert_eq!(err.error_kind, ErrorKind::OAuth(OAuthErrorKind::UserInfoFailed));
        let source = std::error::Error::source(&err)
            .and_then(|s| s.downcast_ref::<Error>())
            .unwrap();
        assert_eq!(source.error_kind, ErrorKind::Http(HttpErrorKind::Status(500)));
    }
}
