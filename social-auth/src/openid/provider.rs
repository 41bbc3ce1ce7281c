//! OpenID 2.0 relying party: checkid_setup redirect and assertion mapping.

use async_trait::async_trait;
use tracing::info;
use url::Url;

use super::discovery::YadisDiscovery;
use crate::error::{discovery_error_from, oauth_error, DiscoveryErrorKind, Error, OAuthErrorKind};
use crate::http::HttpClient;
use crate::oauth::{
    callback_with_state, generate_state, verify_state, AuthenticatedClient,
    AuthenticationProvider, CallbackQuery, Gender, RedirectToAuthenticateSettings,
    UserInformation,
};

pub const OPENID_NAMESPACE: &str = "http://specs.openid.net/auth/2.0";
pub const IDENTIFIER_SELECT: &str = "http://specs.openid.net/auth/2.0/identifier_select";
pub const SREG_NAMESPACE: &str = "http://openid.net/extensions/sreg/1.1";
/// Simple registration fields requested from the provider.
pub const SREG_REQUIRED: &str = "nickname,email,fullname,gender,language";

/// OpenID 2.0 relying party for one provider identifier.
///
/// The positive assertion is mapped without signature verification.
pub struct OpenIdProvider {
    name: String,
    identifier: String,
    discovery: YadisDiscovery,
}

impl OpenIdProvider {
    pub fn new(identifier: &str, http_client: HttpClient) -> Result<Self, Error> {
        Self::with_discovery(identifier, YadisDiscovery::new(http_client))
    }

    pub fn with_discovery(identifier: &str, discovery: YadisDiscovery) -> Result<Self, Error> {
        Url::parse(identifier)
            .map_err(|e| discovery_error_from(DiscoveryErrorKind::InvalidIdentifier, e))?;

        Ok(Self {
            name: "openid".to_string(),
            identifier: identifier.to_string(),
            discovery,
        })
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// `checkid_setup` request for the discovered endpoint.
    pub fn checkid_setup_url(&self, endpoint: &Url, callback_uri: &Url, state: &str) -> Url {
        let return_to = callback_with_state(callback_uri, state);
        let realm = format!("{}/", callback_uri.origin().ascii_serialization());

        let mut url = endpoint.clone();
        url.query_pairs_mut()
            .append_pair("openid.ns", OPENID_NAMESPACE)
            .append_pair("openid.mode", "checkid_setup")
            .append_pair("openid.claimed_id", IDENTIFIER_SELECT)
            .append_pair("openid.identity", IDENTIFIER_SELECT)
            .append_pair("openid.return_to", return_to.as_str())
            .append_pair("openid.realm", &realm)
            .append_pair("openid.ns.sreg", SREG_NAMESPACE)
            .append_pair("openid.sreg.required", SREG_REQUIRED);
        url
    }
}

/// Map the simple registration fields of a positive assertion.
fn map_assertion(query: &CallbackQuery) -> Result<UserInformation, Error> {
    let id = query
        .get("openid.claimed_id")
        .or_else(|| query.get("openid.identity"))
        .filter(|id| !id.is_empty())
        .ok_or_else(|| {
            oauth_error(
                OAuthErrorKind::MissingParameter,
                "Assertion carries no 'openid.claimed_id'",
            )
        })?;
    let sreg = |field: &str| {
        query
            .get(&format!("openid.sreg.{}", field))
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };

    Ok(UserInformation {
        id: id.to_string(),
        name: sreg("fullname"),
        email: sreg("email"),
        locale: sreg("language"),
        user_name: sreg("nickname"),
        gender: sreg("gender")
            .map(|g| Gender::from_provider_value(&g))
            .unwrap_or_default(),
        picture: None,
    })
}

#[async_trait]
impl AuthenticationProvider for OpenIdProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn redirect_to_authenticate(
        &self,
        callback_uri: &Url,
    ) -> Result<RedirectToAuthenticateSettings, Error> {
        let endpoint = self.discovery.discover(&self.identifier).await?;
        let state = generate_state();

        Ok(RedirectToAuthenticateSettings {
            redirect_uri: self.checkid_setup_url(&endpoint, callback_uri, &state),
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

        match query.require("openid.mode")? {
            "id_res" => {}
            "cancel" => {
                return Err(oauth_error(
                    OAuthErrorKind::AccessDenied,
                    "User cancelled the OpenID login",
                ))
            }
            other => {
                return Err(oauth_error(
                    OAuthErrorKind::InvalidResponse,
                    &format!("Unexpected openid.mode '{}'", other),
                ))
            }
        }

        let user_information = map_assertion(query)?;
        info!("Authenticated OpenID user {}", user_information.id);

        Ok(AuthenticatedClient {
            provider_name: self.name.clone(),
            access_token: None,
            user_information,
        })
    }
}
