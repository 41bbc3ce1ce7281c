//! OAuth 1.0a: HMAC-SHA1 signing and the request token / access token flow.

mod provider;
pub mod signature;

pub use provider::{OAuth10Provider, OAuth1Descriptor, OAuth1Endpoints, TokenPair};
