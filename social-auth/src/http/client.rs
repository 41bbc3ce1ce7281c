//! Client construction for provider calls.

use std::time::Duration;

use reqwest_middleware::ClientBuilder;
use reqwest_retry::policies::ExponentialBackoff;
use reqwest_retry::RetryTransientMiddleware;

/// HTTP client used to talk to OAuth and OpenID providers.
pub type HttpClient = reqwest_middleware::ClientWithMiddleware;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const MIN_RETRY_INTERVAL: Duration = Duration::from_millis(500);
const MAX_RETRY_INTERVAL: Duration = Duration::from_secs(10);

/// Settings applied by [`HttpClientBuilder::build`].
#[derive(Debug, Clone, PartialEq)]
pub struct HttpClientConfig {
    pub timeout: Duration,
    /// Zero leaves the retry middleware out entirely.
    pub max_retries: u32,
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_retries: 0,
            user_agent: format!("social-auth/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Builds the client shared by every provider of a host.
///
/// Login calls are not retried unless [`with_max_retries`](Self::with_max_retries)
/// asks for it; transient failures then back off exponentially between
/// 500 ms and 10 s.
#[derive(Debug, Clone, Default)]
pub struct HttpClientBuilder {
    config: HttpClientConfig,
}

impl HttpClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: HttpClientConfig) -> Self {
        Self { config }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.config.max_retries = max_retries;
        self
    }

    /// Some providers (GitHub among them) reject requests without a user agent.
    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.config.user_agent = user_agent;
        self
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    pub fn build(self) -> Result<HttpClient, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(self.config.timeout)
            .user_agent(self.config.user_agent)
            .build()?;

        let builder = ClientBuilder::new(client);
        let builder = match self.config.max_retries {
            0 => builder,
            max_retries => {
                let policy = ExponentialBackoff::builder()
                    .retry_bounds(MIN_RETRY_INTERVAL, MAX_RETRY_INTERVAL)
                    .build_with_max_retries(max_retries);
                builder.with(RetryTransientMiddleware::new_with_policy(policy))
            }
        };

        Ok(builder.build())
    }
}
