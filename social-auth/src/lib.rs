//! # social-auth
//!
//! Social login client for web applications:
//! - OAuth 1.0a (HMAC-SHA1 signed request token / access token flow)
//! - OAuth 2.0 authorization code flow, configured per provider by a descriptor
//! - OpenID 2.0 with YADIS discovery and simple registration
//! - CSRF `state` issuing and checking
//! - HTTP client building with middleware
//!
//! ## Architecture
//!
//! Every provider implements [`oauth::AuthenticationProvider`]. A login is a
//! redirect to the provider followed by a callback, and both ends normalize to
//! the same [`oauth::AuthenticatedClient`]. [`service::AuthenticationService`]
//! keeps the registered providers and the pending `state` values between the two.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use social_auth::{
//!     http::HttpClientBuilder,
//!     params::ProviderParams,
//!     providers,
//!     service::AuthenticationService,
//! };
//!
//! let client = HttpClientBuilder::new().build()?;
//! let mut service = AuthenticationService::new();
//! service.add_provider(providers::build("github", params, client)?);
//!
//! let settings = service
//!     .redirect_to_authentication_provider("github", &callback_uri)
//!     .await?;
//! ```

pub mod error;
pub mod http;
pub mod oauth;
pub mod oauth10;
pub mod oauth20;
pub mod openid;
pub mod params;
pub mod providers;
pub mod service;

// Re-export commonly used types
pub use error::{Error, ErrorKind};
