//! CSRF state generation, checking and bookkeeping for login flows.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use url::Url;

use super::CallbackQuery;
use crate::error::{oauth_error, Error, OAuthErrorKind};

/// A login that has been redirected to a provider and not yet completed.
#[derive(Debug, Clone)]
pub struct PendingLogin {
    /// Provider the user was sent to.
    pub provider_name: String,
    /// Callback URI used for the redirect; token exchanges must repeat it.
    pub callback_uri: Url,
    /// When this state expires.
    pub expires_at: DateTime<Utc>,
}

/// Manager for issued `state` values with expiration.
///
/// Server-side counterpart of an anti-forgery cookie: a state is only accepted
/// once, for the provider it was issued for, before it expires.
#[derive(Clone)]
pub struct StateManager {
    states: Arc<Mutex<HashMap<String, PendingLogin>>>,
    ttl: Duration,
}

impl StateManager {
    /// Create a new state manager with default TTL of 10 minutes.
    pub fn new() -> Self {
        Self::with_ttl(Duration::minutes(10))
    }

    /// Create a new state manager with custom TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            states: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    /// Record a pending login under an already issued state.
    ///
    /// Expired entries are dropped first, so abandoned logins do not accumulate.
    ///
    /// # Arguments
    ///
    /// * `state` - State returned by the provider's redirect settings
    /// * `provider_name` - Provider the user is being sent to
    /// * `callback_uri` - Callback URI used for the redirect
    pub fn remember(&self, state: &str, provider_name: &str, callback_uri: &Url) {
        let now = Utc::now();
        let data = PendingLogin {
            provider_name: provider_name.to_string(),
            callback_uri: callback_uri.clone(),
            expires_at: now + self.ttl,
        };

        let mut states = self.lock();
        states.retain(|_, pending| pending.expires_at > now);
        states.insert(state.to_string(), data);
    }

    /// Validate and consume a state token.
    ///
    /// Removes the state from storage and returns the pending login if valid.
    ///
    /// # Returns
    ///
    /// `Some(PendingLogin)` if valid, `None` if unknown or expired.
    pub fn take(&self, state: &str) -> Option<PendingLogin> {
        let data = self.lock().remove(state)?;
        if Utc::now() > data.expires_at {
            return None;
        }
        Some(data)
    }

    /// Clean up expired states.
    ///
    /// [`remember`](Self::remember) already does this on every insert.
    pub fn cleanup_expired(&self) {
        let now = Utc::now();
        self.lock().retain(|_, data| data.expires_at > now);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // The map is never left half-updated, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, PendingLogin>> {
        self.states.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate a cryptographically random state token.
pub fn generate_state() -> String {
    let random_bytes: [u8; 32] = rand::thread_rng().gen();
    hex::encode(random_bytes)
}

/// Check the callback's `state` against the one issued at redirect time.
///
/// Fails when the callback has no `state`, when none was issued, or when they differ.
pub fn verify_state(query: &CallbackQuery, expected_state: &str) -> Result<(), Error> {
    let received = query.get("state").filter(|s| !s.is_empty()).ok_or_else(|| {
        oauth_error(
            OAuthErrorKind::InvalidState,
            "No state parameter was returned by the provider",
        )
    })?;

    if expected_state.is_empty() {
        return Err(oauth_error(
            OAuthErrorKind::InvalidState,
            "No state was issued for this login",
        ));
    }

    if received != expected_state {
        return Err(oauth_error(
            OAuthErrorKind::InvalidState,
            "The returned state does not match the issued state",
        ));
    }

    Ok(())
}
