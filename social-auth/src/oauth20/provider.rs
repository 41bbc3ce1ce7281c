//! Generic OAuth 2.0 authorization code provider.

use async_trait::async_trait;
use oauth2::{AuthUrl, AuthorizationCode, ClientId, ClientSecret, Scope, TokenUrl};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use secrecy::ExposeSecret;
use tracing::{debug, info};
use url::Url;

use super::token_response::{parse_token_response, TokenResponseFormat};
use crate::error::{oauth_error, oauth_error_from, Error, OAuthErrorKind};
use crate::http::{read_success_body, HttpClient};
use crate::oauth::{
    generate_state, verify_state, AccessToken, AuthenticatedClient, AuthenticationProvider,
    CallbackQuery, ProfileMapper, RedirectToAuthenticateSettings, UserInformation,
};
use crate::params::ProviderParams;

/// How the access token is attached to the profile request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenPlacement {
    /// `Authorization: Bearer <token>`
    Bearer,
    /// `?<name>=<token>`
    QueryParameter(String),
    /// `Authorization: <scheme> <token>`
    AuthorizationScheme(String),
}

/// Endpoints of an OAuth 2.0 provider.
#[derive(Debug, Clone)]
pub struct OAuth2Endpoints {
    pub authorize: String,
    pub token: String,
    pub user_info: String,
}

/// Everything that differs between OAuth 2.0 providers.
#[derive(Debug, Clone)]
pub struct OAuth2Descriptor {
    pub name: String,
    pub endpoints: OAuth2Endpoints,
    /// Requested when the caller supplies no scopes.
    pub default_scopes: Vec<String>,
    pub scope_separator: String,
    pub token_format: TokenResponseFormat,
    pub token_placement: TokenPlacement,
    /// Appended to the authorize URL, e.g. 37signals' `type=web_server`.
    pub extra_authorize_params: Vec<(String, String)>,
    /// Appended to the token exchange form.
    pub extra_token_params: Vec<(String, String)>,
    pub map_user: ProfileMapper,
}

/// OAuth 2.0 provider driven by a descriptor.
///
/// Handles OAuth 2.0 authorization code flows, including:
/// - Authorization URL generation with `state`
/// - Authorization code exchange
/// - User info retrieval and mapping
pub struct OAuth20Provider {
    descriptor: OAuth2Descriptor,
    client_id: ClientId,
    client_secret: ClientSecret,
    scopes: Vec<Scope>,
    auth_url: AuthUrl,
    token_url: TokenUrl,
    http_client: HttpClient,
}

impl OAuth20Provider {
    /// Create a new OAuth 2.0 provider.
    ///
    /// # Arguments
    ///
    /// * `descriptor` - Provider endpoints, formats and profile mapping
    /// * `params` - Client ID, client secret and optional scopes
    /// * `http_client` - Client used for every provider call
    pub fn new(
        descriptor: OAuth2Descriptor,
        params: ProviderParams,
        http_client: HttpClient,
    ) -> Result<Self, Error> {
        let auth_url = AuthUrl::new(descriptor.endpoints.authorize.clone())?;
        let token_url = TokenUrl::new(descriptor.endpoints.token.clone())?;
        Url::parse(&descriptor.endpoints.user_info)?;

        let defaults: Vec<&str> = descriptor.default_scopes.iter().map(String::as_str).collect();
        let scopes = params
            .effective_scopes(&defaults)
            .into_iter()
            .map(Scope::new)
            .collect();

        Ok(Self {
            client_id: ClientId::new(params.public_api_key().to_string()),
            client_secret: ClientSecret::new(params.secret_api_key().expose_secret().clone()),
            scopes,
            auth_url,
            token_url,
            descriptor,
            http_client,
        })
    }

    pub fn descriptor(&self) -> &OAuth2Descriptor {
        &self.descriptor
    }

    /// Scope parameter value, joined with the provider's separator.
    pub fn scope(&self) -> String {
        self.scopes
            .iter()
            .map(|scope| scope.as_str())
            .collect::<Vec<_>>()
            .join(&self.descriptor.scope_separator)
    }

    /// Generate the authorization URL for user consent.
    pub fn authorization_url(&self, callback_uri: &Url, state: &str) -> Url {
        let mut url = self.auth_url.url().clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("client_id", self.client_id.as_str())
                .append_pair("redirect_uri", callback_uri.as_str())
                .append_pair("response_type", "code");
            let scope = self.scope();
            if !scope.is_empty() {
                query.append_pair("scope", &scope);
            }
            query.append_pair("state", state);
            for (key, value) in &self.descriptor.extra_authorize_params {
                query.append_pair(key, value);
            }
        }
        url
    }

    /// Exchange an authorization code for an access token.
    ///
    /// `callback_uri` must be the same one used in the authorization URL.
    pub async fn exchange_code(
        &self,
        code: &AuthorizationCode,
        callback_uri: &Url,
    ) -> Result<AccessToken, Error> {
        let mut form: Vec<(&str, &str)> = vec![
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.secret().as_str()),
            ("redirect_uri", callback_uri.as_str()),
            ("code", code.secret().as_str()),
            ("grant_type", "authorization_code"),
        ];
        for (key, value) in &self.descriptor.extra_token_params {
            form.push((key.as_str(), value.as_str()));
        }

        debug!("Exchanging {} authorization code for tokens", self.descriptor.name);

        let mut request = self.http_client.post(self.token_url.url().as_str()).form(&form);
        if self.descriptor.token_format == TokenResponseFormat::Json {
            request = request.header(ACCEPT, "application/json");
        }
        let response = request.send().await?;

        let body = read_success_body(response, &format!("{} token exchange", self.descriptor.name))
            .await
            .map_err(|e| oauth_error_from(OAuthErrorKind::TokenExchangeFailed, e))?;

        parse_token_response(&body, self.descriptor.token_format)
    }

    /// Get the user's profile using an access token.
    pub async fn user_information(&self, access_token: &AccessToken) -> Result<UserInformation, Error> {
        let token = access_token.public_token.expose_secret();
        let mut url = Url::parse(&self.descriptor.endpoints.user_info)?;
        if let TokenPlacement::QueryParameter(name) = &self.descriptor.token_placement {
            url.query_pairs_mut().append_pair(name, token);
        }

        let mut request = self
            .http_client
            .get(url.as_str())
            .header(ACCEPT, "application/json");
        request = match &self.descriptor.token_placement {
            TokenPlacement::Bearer => request.bearer_auth(token),
            TokenPlacement::AuthorizationScheme(scheme) => {
                request.header(AUTHORIZATION, format!("{} {}", scheme, token))
            }
            TokenPlacement::QueryParameter(_) => request,
        };

        let response = request.send().await?;
        let body = read_success_body(response, &format!("{} user info", self.descriptor.name))
            .await
            .map_err(|e| oauth_error_from(OAuthErrorKind::UserInfoFailed, e))?;

        let profile: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| oauth_error_from(OAuthErrorKind::InvalidResponse, e))?;
        (self.descriptor.map_user)(&profile)
    }
}

#[async_trait]
impl AuthenticationProvider for OAuth20Provider {
    fn name(&self) -> &str {
        &self.descriptor.name
    }

    async fn redirect_to_authenticate(
        &self,
        callback_uri: &Url,
    ) -> Result<RedirectToAuthenticateSettings, Error> {
        let state = generate_state();
        Ok(RedirectToAuthenticateSettings {
            redirect_uri: self.authorization_url(callback_uri, &state),
            state,
        })
    }

    async fn authenticate_client(
        &self,
        query: &CallbackQuery,
        expected_state: &str,
        callback_uri: &Url,
    ) -> Result<AuthenticatedClient, Error> {
        verify_state(query, expected_state)?;

        if let Some(error) = query.get("error") {
            let reason = query
                .get("error_description")
                .or_else(|| query.get("error_reason"))
                .unwrap_or("no description");
            return Err(oauth_error(
                OAuthErrorKind::AccessDenied,
                &format!("{} returned '{}': {}", self.descriptor.name, error, reason),
            ));
        }

        let code = AuthorizationCode::new(query.require("code")?.to_string());
        let access_token = self.exchange_code(&code, callback_uri).await?;
        let user_information = self.user_information(&access_token).await?;

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
