//! Normalized user profile and the terminal result of a login flow.

use serde::{Deserialize, Serialize};

use super::AccessToken;
use crate::error::Error;

/// Maps a provider's JSON profile response to a `UserInformation`.
pub type ProfileMapper = fn(&serde_json::Value) -> Result<UserInformation, Error>;

/// Gender as reported by a provider, normalized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    #[default]
    Unknown,
    Male,
    Female,
}

impl Gender {
    /// Map a provider's free-form value (`"male"`, `"F"`, …) to a gender.
    pub fn from_provider_value(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "male" | "m" => Gender::Male,
            "female" | "f" => Gender::Female,
            _ => Gender::Unknown,
        }
    }
}

/// User profile mapped from a provider-specific response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserInformation {
    /// Provider's unique user identifier.
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub locale: Option<String>,
    pub user_name: Option<String>,
    pub gender: Gender,
    /// Profile picture URL.
    pub picture: Option<String>,
}

/// Provider name, access token and user profile of a completed login.
#[derive(Debug, Clone)]
pub struct AuthenticatedClient {
    pub provider_name: String,
    /// `None` for OpenID 2.0 logins, which never issue a token.
    pub access_token: Option<AccessToken>,
    pub user_information: UserInformation,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gender_from_provider_value() {
        assert_eq!(Gender::from_provider_value("male"), Gender::Male);
        assert_eq!(Gender::from_provider_value("M"), Gender::Male);
        assert_eq!(Gender::from_provider_value(" Female "), Gender::Female);
        assert_eq!(Gender::from_provider_value("f"), Gender::Female);
        assert_eq!(Gender::from_provider_value("other"), Gender::Unknown);
        assert_eq!(Gender::from_provider_value(""), Gender::Unknown);
    }

    #[test]
    fn test_user_information_serializes_gender_snake_case() {
        let user = UserInformation {
            id: "42".to_string(),
            gender: Gender::Female,
            ..Default::default()
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["gender"], "female");
        assert_eq!(json["id"], "42");
    }
}
