//! OAuth 2.0 authorization code flow, configured per provider by a descriptor.

mod provider;
mod token_response;

pub use provider::{OAuth20Provider, OAuth2Descriptor, OAuth2Endpoints, TokenPlacement};
pub use token_response::{parse_token_response, TokenResponseFormat};
