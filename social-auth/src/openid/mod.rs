//! OpenID 2.0: YADIS discovery and the `checkid_setup` login.

mod discovery;
mod provider;

pub use discovery::{first_service_uri, YadisDiscovery, XRD_NAMESPACE};
pub use provider::{OpenIdProvider, IDENTIFIER_SELECT, OPENID_NAMESPACE, SREG_NAMESPACE, SREG_REQUIRED};
