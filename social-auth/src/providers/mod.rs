//! Pre-defined providers and construction by name.

mod config;
mod fake;
pub mod profiles;

pub use config::{
    amazon, arcgis, facebook, github, google, instagram, linkedin, thirty_seven_signals, twitter,
    windows_live,
};
pub use fake::FakeProvider;

use crate::error::{config_error, ConfigErrorKind, Error};
use crate::http::HttpClient;
use crate::oauth::AuthenticationProvider;
use crate::oauth10::OAuth10Provider;
use crate::oauth20::OAuth20Provider;
use crate::openid::OpenIdProvider;
use crate::params::ProviderParams;

/// Names accepted by [`build`], plus `openid` (see [`build_openid`]).
pub const PROVIDER_NAMES: &[&str] = &[
    "google",
    "facebook",
    "github",
    "linkedin",
    "amazon",
    "windowslive",
    "arcgis",
    "instagram",
    "37signals",
    "twitter",
    "openid",
    "fake",
];

/// Build a key-based provider by name (case-insensitive).
///
/// # Arguments
///
/// * `name` - Provider name, e.g. `"github"`
/// * `params` - Client key, secret and optional scopes
/// * `http_client` - Client used for every provider call
pub fn build(
    name: &str,
    params: ProviderParams,
    http_client: HttpClient,
) -> Result<Box<dyn AuthenticationProvider>, Error> {
    let descriptor = match name.trim().to_lowercase().as_str() {
        "google" => google(),
        "facebook" => facebook(),
        "github" => github(),
        "linkedin" => linkedin(),
        "amazon" => amazon(),
        "windowslive" => windows_live(),
        "arcgis" => arcgis(),
        "instagram" => instagram(),
        "37signals" => thirty_seven_signals(),
        "twitter" => {
            return Ok(Box::new(OAuth10Provider::new(twitter(), params, http_client)));
        }
        "fake" => return Ok(Box::new(FakeProvider::new())),
        "openid" => {
            return Err(config_error(
                ConfigErrorKind::InvalidProviderParams,
                "OpenID providers are built from an identifier, see build_openid",
            ))
        }
        other => {
            return Err(config_error(
                ConfigErrorKind::UnknownProvider,
                &format!("Unknown authentication provider '{}'", other),
            ))
        }
    };

    Ok(Box::new(OAuth20Provider::new(descriptor, params, http_client)?))
}

/// Build an OpenID 2.0 provider for an identifier URL, e.g. `https://me.yahoo.com`.
pub fn build_openid(
    identifier: &str,
    http_client: HttpClient,
) -> Result<Box<dyn AuthenticationProvider>, Error> {
    Ok(Box::new(OpenIdProvider::new(identifier, http_client)?))
}
