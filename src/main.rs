use log::{error, info, warn};
use secrecy::SecretString;
use service::{config::Config, logging::Logger};
use social_auth::{
    error::{config_error, ConfigErrorKind},
    http::HttpClientBuilder,
    oauth::{AuthenticationProvider, CallbackQuery},
    params::ProviderParams,
    providers, Error,
};
use url::Url;

#[tokio::main]
async fn main() {
    let config = Config::new();
    if let Err(e) = Logger::init_logger(&config) {
        eprintln!("Failed to start logger: {e}");
    }

    if let Err(e) = run(&config).await {
        error!("Login with {} failed: {}", config.provider, e.message_chain());
        std::process::exit(1);
    }
}

async fn run(config: &Config) -> Result<(), Error> {
    let http_client = HttpClientBuilder::new()
        .with_timeout(config.http_timeout())
        .with_max_retries(config.http_max_retries)
        .build()?;
    let provider = build_provider(config, http_client)?;
    let callback_uri = Url::parse(config.callback_uri())?;

    match config.callback_url() {
        Some(callback_url) => {
            let state = config.state().ok_or_else(|| {
                config_error(
                    ConfigErrorKind::InvalidProviderParams,
                    "--state is required to complete a login",
                )
            })?;
            let query = CallbackQuery::from_url(&Url::parse(callback_url)?);
            let client = provider
                .authenticate_client(&query, state, &callback_uri)
                .await?;

            info!("Signed in to {} as {}", client.provider_name, client.user_information.id);
            if let Some(expires_on) = client.access_token.as_ref().and_then(|t| t.expires_on) {
                info!("Access token expires on {}", expires_on.to_rfc3339());
            }
            match serde_json::to_string_pretty(&client.user_information) {
                Ok(json) => println!("{json}"),
                Err(e) => warn!("Could not serialize user information: {e}"),
            }
        }
        None => {
            let settings = provider.redirect_to_authenticate(&callback_uri).await?;
            info!("Redirecting to {} for sign in", provider.name());
            println!("redirect_uri: {}", settings.redirect_uri);
            println!("state: {}", settings.state);
        }
    }

    Ok(())
}

fn build_provider(
    config: &Config,
    http_client: social_auth::http::HttpClient,
) -> Result<Box<dyn AuthenticationProvider>, Error> {
    if config.provider.eq_ignore_ascii_case("openid") {
        let identifier = config.openid_identifier().ok_or_else(|| {
            config_error(
                ConfigErrorKind::InvalidProviderParams,
                "--openid-identifier is required for OpenID logins",
            )
        })?;
        return providers::build_openid(identifier, http_client);
    }

    let (key, secret) = match (config.provider_key(), config.provider_secret()) {
        (Some(key), Some(secret)) => (key, secret),
        _ if config.provider.eq_ignore_ascii_case("fake") => ("fake", "fake"),
        _ => {
            return Err(config_error(
                ConfigErrorKind::InvalidProviderParams,
                "--provider-key and --provider-secret are required",
            ))
        }
    };
    let params = ProviderParams::new(key.to_string(), SecretString::from(secret.to_string()))?
        .with_scopes(config.scopes.clone());

    providers::build(&config.provider, params, http_client)
}
