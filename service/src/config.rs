use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Callback used when none is configured; matches the demo host's route.
pub const DEFAULT_CALLBACK_URI: &str = "http://localhost:4000/authentication/callback";

#[derive(Clone, Debug, PartialEq)]
pub enum RustEnv {
    Development,
    Production,
    Staging,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RustEnvParseError;

impl FromStr for RustEnv {
    type Err = RustEnvParseError;
    fn from_str(level: &str) -> Result<RustEnv, Self::Err> {
        match level.to_lowercase().as_str() {
            "development" => Ok(RustEnv::Development),
            "production" => Ok(RustEnv::Production),
            "staging" => Ok(RustEnv::Staging),
            _ => Err(RustEnvParseError),
        }
    }
}

impl fmt::Display for RustEnv {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RustEnv::Development => write!(f, "development"),
            RustEnv::Production => write!(f, "production"),
            RustEnv::Staging => write!(f, "staging"),
        }
    }
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Name of the authentication provider to log in with (google, github, twitter, openid, fake, ...)
    #[arg(short, long, env, default_value = "fake")]
    pub provider: String,

    /// The client ID / consumer key issued by the provider.
    #[arg(long, env)]
    provider_key: Option<String>,

    /// The client secret / consumer secret issued by the provider.
    #[arg(long, env, hide_env_values = true)]
    provider_secret: Option<String>,

    /// Scopes to request instead of the provider's defaults.
    #[arg(long, env, value_delimiter = ',', use_value_delimiter = true)]
    pub scopes: Vec<String>,

    /// The URI the provider redirects back to once the user has signed in.
    #[arg(long, env, default_value = DEFAULT_CALLBACK_URI)]
    callback_uri: String,

    /// The OpenID identifier URL to discover, required when provider is `openid`.
    #[arg(long, env)]
    openid_identifier: Option<String>,

    /// The full URL the browser landed on after signing in. Completes the login
    /// instead of starting a new one.
    #[arg(long, env)]
    callback_url: Option<String>,

    /// The `state` printed when the login was started.
    #[arg(short, long, env)]
    state: Option<String>,

    /// Timeout in seconds for each call to the provider
    #[arg(long, env, default_value_t = 30)]
    pub http_timeout_secs: u64,

    /// How many times a failed provider call is retried. Zero disables retries.
    #[arg(long, env, default_value_t = 0)]
    pub http_max_retries: u32,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap_or(LevelFilter::Info)),
        )]
    pub log_level_filter: LevelFilter,

    /// Set the Rust runtime environment to use.
    #[arg(
    short,
    long,
    env,
    default_value_t = RustEnv::Development,
    value_parser = clap::builder::PossibleValuesParser::new([
        "DEVELOPMENT", "PRODUCTION", "STAGING",
        "development", "production", "staging"
    ])
        .map(|s| s.parse::<RustEnv>().unwrap_or(RustEnv::Development)),
    )]
    pub runtime_env: RustEnv,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    pub fn provider_key(&self) -> Option<&str> {
        self.provider_key.as_deref()
    }

    pub fn provider_secret(&self) -> Option<&str> {
        self.provider_secret.as_deref()
    }

    pub fn set_provider_credentials(mut self, key: String, secret: String) -> Self {
        self.provider_key = Some(key);
        self.provider_secret = Some(secret);
        self
    }

    pub fn callback_uri(&self) -> &str {
        &self.callback_uri
    }

    pub fn openid_identifier(&self) -> Option<&str> {
        self.openid_identifier.as_deref()
    }

    pub fn callback_url(&self) -> Option<&str> {
        self.callback_url.as_deref()
    }

    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn runtime_env(&self) -> RustEnv {
        self.runtime_env.clone()
    }

    pub fn is_production(&self) -> bool {
        self.runtime_env() == RustEnv::Production
    }
}
