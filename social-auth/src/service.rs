//! Registry of configured providers and the server side of the CSRF `state`.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};
use url::Url;

use crate::error::{config_error, oauth_error, ConfigErrorKind, Error, OAuthErrorKind};
use crate::oauth::{
    AuthenticatedClient, AuthenticationProvider, CallbackQuery, RedirectToAuthenticateSettings,
    StateManager,
};

/// Runs both halves of a login against registered providers.
///
/// Providers are keyed by lower-case name. Each redirect records its `state`,
/// and a callback is only accepted once, for the provider and callback URI
/// that state was issued for.
#[derive(Clone, Default)]
pub struct AuthenticationService {
    providers: HashMap<String, Arc<dyn AuthenticationProvider>>,
    states: StateManager,
}

impl AuthenticationService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state_manager(states: StateManager) -> Self {
        Self {
            providers: HashMap::new(),
            states,
        }
    }

    /// Register a provider, replacing any provider of the same name.
    pub fn add_provider(&mut self, provider: Box<dyn AuthenticationProvider>) {
        let name = provider.name().to_lowercase();
        debug!("Registering authentication provider {}", name);
        self.providers.insert(name, Arc::from(provider));
    }

    pub fn provider(&self, name: &str) -> Result<Arc<dyn AuthenticationProvider>, Error> {
        self.providers
            .get(&name.to_lowercase())
            .cloned()
            .ok_or_else(|| {
                config_error(
                    ConfigErrorKind::UnknownProvider,
                    &format!("No authentication provider named '{}' is registered", name),
                )
            })
    }

    /// Registered provider names, sorted.
    pub fn provider_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.providers.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn state_manager(&self) -> &StateManager {
        &self.states
    }

    /// Start a login: build the provider redirect and remember its `state`.
    pub async fn redirect_to_authentication_provider(
        &self,
        name: &str,
        callback_uri: &Url,
    ) -> Result<RedirectToAuthenticateSettings, Error> {
        let provider = self.provider(name)?;
        let settings = provider.redirect_to_authenticate(callback_uri).await?;

        self.states
            .remember(&settings.state, provider.name(), callback_uri);
        Ok(settings)
    }

    /// Complete a login from the provider's callback.
    ///
    /// The callback's `state` is consumed before the provider is called, so a
    /// replayed or forged callback fails without any network traffic.
    pub async fn get_authenticated_client(
        &self,
        name: &str,
        query: &CallbackQuery,
    ) -> Result<AuthenticatedClient, Error> {
        let provider = self.provider(name)?;

        let state = query.require("state").map_err(|_| {
            oauth_error(
                OAuthErrorKind::InvalidState,
                "No state parameter was returned by the provider",
            )
        })?;
        let pending = self.states.take(state).ok_or_else(|| {
            warn!("Rejected callback for {} with unknown or expired state", name);
            oauth_error(
                OAuthErrorKind::InvalidState,
                "Unknown or expired state",
            )
        })?;
        if pending.provider_name != provider.name() {
            warn!(
                "Rejected callback for {}: state was issued for {}",
                provider.name(),
                pending.provider_name
            );
            return Err(oauth_error(
                OAuthErrorKind::InvalidState,
                "State was issued for a different provider",
            ));
        }

        provider
            .authenticate_client(query, state, &pending.callback_uri)
            .await
    }
}
