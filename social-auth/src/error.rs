//! Error types for the `social-auth` crate.
//!
//! Follows the same pattern as the rest of the workspace: a root `Error` struct
//! holding an error kind tree and an optional source for error chaining. Every
//! failure of a login flow surfaces as this one type; nothing is retried here.

use std::error::Error as StdError;
use std::fmt;

/// Top-level error type for social-auth crate.
/// Holds error kind and optional source for error chaining.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Major categories of errors in social-auth.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    OAuth(OAuthErrorKind),
    Http(HttpErrorKind),
    Discovery(DiscoveryErrorKind),
    Config(ConfigErrorKind),
}

/// Errors from the OAuth 1.0a / OAuth 2.0 / OpenID handshakes.
#[derive(Debug, PartialEq)]
pub enum OAuthErrorKind {
    /// Callback `state` missing, unknown, expired or different from the one issued.
    InvalidState,
    /// The user declined, cancelled, or the provider reported an `error`.
    AccessDenied,
    /// A required callback querystring parameter is absent.
    MissingParameter,
    /// A required field is absent from a provider response.
    MissingField,
    RequestTokenFailed,
    TokenExchangeFailed,
    UserInfoFailed,
    Signature,
    InvalidResponse,
}

/// Errors from HTTP client operations.
#[derive(Debug, PartialEq)]
pub enum HttpErrorKind {
    BuilderFailed,
    RequestFailed,
    Network,
    /// The remote side answered with a non-success status code.
    Status(u16),
}

/// Errors from OpenID (YADIS) endpoint discovery.
#[derive(Debug, PartialEq)]
pub enum DiscoveryErrorKind {
    InvalidIdentifier,
    InvalidDocument,
    NoEndpoint,
}

/// Errors from provider construction and configuration.
#[derive(Debug, PartialEq)]
pub enum ConfigErrorKind {
    InvalidProviderParams,
    UnknownProvider,
    InvalidUrl,
}

impl Error {
    /// Renders this error and every nested source as a single line, outermost first.
    pub fn message_chain(&self) -> String {
        let mut messages = vec![self.to_string()];
        let mut current = StdError::source(self);
        while let Some(err) = current {
            messages.push(err.to_string());
            current = err.source();
        }
        messages.join(": ")
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            ErrorKind::OAuth(kind) => write!(f, "OAuth error: {:?}", kind),
            ErrorKind::Http(kind) => write!(f, "HTTP error: {:?}", kind),
            ErrorKind::Discovery(kind) => write!(f, "Discovery error: {:?}", kind),
            ErrorKind::Config(kind) => write!(f, "Configuration error: {:?}", kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let error_kind = if err.is_builder() {
            ErrorKind::Http(HttpErrorKind::BuilderFailed)
        } else if err.is_request() {
            ErrorKind::Http(HttpErrorKind::RequestFailed)
        } else {
            ErrorKind::Http(HttpErrorKind::Network)
        };

        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

impl From<reqwest_middleware::Error> for Error {
    fn from(err: reqwest_middleware::Error) -> Self {
        match err {
            reqwest_middleware::Error::Reqwest(err) => err.into(),
            other => Error {
                source: Some(Box::new(other)),
                error_kind: ErrorKind::Http(HttpErrorKind::Network),
            },
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::Config(ConfigErrorKind::InvalidUrl),
        }
    }
}

/// Helper function to create OAuth errors.
pub fn oauth_error(kind: OAuthErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::OAuth(kind),
    }
}

/// Helper function to create HTTP errors.
pub fn http_error(kind: HttpErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Http(kind),
    }
}

/// Helper function to create discovery errors.
pub fn discovery_error(kind: DiscoveryErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Discovery(kind),
    }
}

/// Helper function to create configuration errors.
pub fn config_error(kind: ConfigErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Config(kind),
    }
}

/// Wraps an underlying error as the source of an OAuth error.
pub fn oauth_error_from<E>(kind: OAuthErrorKind, err: E) -> Error
where
    E: StdError + Send + Sync + 'static,
{
    Error {
        source: Some(Box::new(err)),
        error_kind: ErrorKind::OAuth(kind),
    }
}

/// Wraps an underlying error as the source of a discovery error.
pub fn discovery_error_from<E>(kind: DiscoveryErrorKind, err: E) -> Error
where
    E: StdError + Send + Sync + 'static,
{
    Error {
        source: Some(Box::new(err)),
        error_kind: ErrorKind::Discovery(kind),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_kind() {
        let err = oauth_error(OAuthErrorKind::InvalidState, "state mismatch");
        assert_eq!(err.to_string(), "OAuth error: InvalidState");
    }

    #[test]
    fn test_message_chain_concatenates_sources() {
        let inner = http_error(HttpErrorKind::Status(500), "token endpoint returned 500");
        let outer = Error {
            source: Some(Box::new(inner)),
            error_kind: ErrorKind::OAuth(OAuthErrorKind::TokenExchangeFailed),
        };

        assert_eq!(
            outer.message_chain(),
            "OAuth error: TokenExchangeFailed: HTTP error: Status(500): token endpoint returned 500"
        );
    }

    #[test]
    fn test_url_parse_error_is_config_error() {
        let err: Error = url::Url::parse("not a url").unwrap_err().into();
        assert_eq!(
            err.error_kind,
            ErrorKind::Config(ConfigErrorKind::InvalidUrl)
        );
    }
}
