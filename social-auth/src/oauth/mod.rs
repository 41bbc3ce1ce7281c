//! Provider abstraction shared by the OAuth 1.0a, OAuth 2.0 and OpenID 2.0 flows.

mod provider;
mod state;
mod token;
mod user;

pub use provider::{AuthenticationProvider, CallbackQuery, RedirectToAuthenticateSettings};
pub use state::{generate_state, verify_state, PendingLogin, StateManager};
pub use token::AccessToken;
pub use user::{AuthenticatedClient, Gender, ProfileMapper, UserInformation};

pub(crate) use provider::callback_with_state;
