//! Profile mappers: one per provider, from the provider's JSON to `UserInformation`.

use serde_json::Value;

use crate::error::{oauth_error, Error, OAuthErrorKind};
use crate::oauth::{Gender, UserInformation};

/// String or number field, as a non-empty string.
fn str_field(profile: &Value, key: &str) -> Option<String> {
    match profile.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn required_id(profile: &Value, key: &str) -> Result<String, Error> {
    str_field(profile, key).ok_or_else(|| {
        oauth_error(
            OAuthErrorKind::MissingField,
            &format!("Profile response has no '{}'", key),
        )
    })
}

fn gender(profile: &Value) -> Gender {
    str_field(profile, "gender")
        .map(|g| Gender::from_provider_value(&g))
        .unwrap_or_default()
}

/// Unwrap a `{"<key>": {...}}` envelope.
fn envelope<'a>(profile: &'a Value, key: &str) -> Result<&'a Value, Error> {
    profile.get(key).filter(|v| v.is_object()).ok_or_else(|| {
        oauth_error(
            OAuthErrorKind::InvalidResponse,
            &format!("Profile response has no '{}' object", key),
        )
    })
}

pub fn google(profile: &Value) -> Result<UserInformation, Error> {
    Ok(UserInformation {
        id: required_id(profile, "id")?,
        name: str_field(profile, "name"),
        email: str_field(profile, "email"),
        locale: str_field(profile, "locale"),
        user_name: str_field(profile, "given_name"),
        gender: gender(profile),
        picture: str_field(profile, "picture"),
    })
}

pub fn facebook(profile: &Value) -> Result<UserInformation, Error> {
    let id = required_id(profile, "id")?;
    Ok(UserInformation {
        picture: Some(format!("https://graph.facebook.com/{}/picture", id)),
        name: str_field(profile, "name"),
        email: str_field(profile, "email"),
        locale: str_field(profile, "locale"),
        user_name: str_field(profile, "username"),
        gender: gender(profile),
        id,
    })
}

pub fn github(profile: &Value) -> Result<UserInformation, Error> {
    Ok(UserInformation {
        id: required_id(profile, "id")?,
        name: str_field(profile, "name"),
        email: str_field(profile, "email"),
        locale: None,
        user_name: str_field(profile, "login"),
        gender: Gender::Unknown,
        picture: str_field(profile, "avatar_url"),
    })
}

pub fn linkedin(profile: &Value) -> Result<UserInformation, Error> {
    Ok(UserInformation {
        id: required_id(profile, "id")?,
        name: str_field(profile, "formattedName"),
        email: str_field(profile, "emailAddress"),
        locale: None,
        user_name: None,
        gender: Gender::Unknown,
        picture: str_field(profile, "pictureUrl"),
    })
}

pub fn amazon(profile: &Value) -> Result<UserInformation, Error> {
    Ok(UserInformation {
        id: required_id(profile, "user_id")?,
        name: str_field(profile, "name"),
        email: str_field(profile, "email"),
        ..Default::default()
    })
}

pub fn windows_live(profile: &Value) -> Result<UserInformation, Error> {
    let email = profile.get("emails").and_then(|emails| {
        str_field(emails, "preferred").or_else(|| str_field(emails, "account"))
    });
    Ok(UserInformation {
        id: required_id(profile, "id")?,
        name: str_field(profile, "name"),
        email,
        locale: str_field(profile, "locale"),
        user_name: None,
        gender: gender(profile),
        picture: None,
    })
}

pub fn arcgis(profile: &Value) -> Result<UserInformation, Error> {
    let username = required_id(profile, "username")?;
    Ok(UserInformation {
        id: username.clone(),
        name: str_field(profile, "fullName"),
        email: str_field(profile, "email"),
        locale: str_field(profile, "culture"),
        user_name: Some(username),
        gender: Gender::Unknown,
        picture: None,
    })
}

pub fn instagram(profile: &Value) -> Result<UserInformation, Error> {
    let data = envelope(profile, "data")?;
    Ok(UserInformation {
        id: required_id(data, "id")?,
        name: str_field(data, "full_name"),
        email: None,
        locale: None,
        user_name: str_field(data, "username"),
        gender: Gender::Unknown,
        picture: str_field(data, "profile_picture"),
    })
}

pub fn thirty_seven_signals(profile: &Value) -> Result<UserInformation, Error> {
    let identity = envelope(profile, "identity")?;
    let name = match (
        str_field(identity, "first_name"),
        str_field(identity, "last_name"),
    ) {
        (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
        (first, last) => first.or(last),
    };
    Ok(UserInformation {
        id: required_id(identity, "id")?,
        name,
        email: str_field(identity, "email_address"),
        ..Default::default()
    })
}

pub fn twitter(profile: &Value) -> Result<UserInformation, Error> {
    Ok(UserInformation {
        id: required_id(profile, "id_str").or_else(|_| required_id(profile, "id"))?,
        name: str_field(profile, "name"),
        email: str_field(profile, "email"),
        locale: str_field(profile, "lang"),
        user_name: str_field(profile, "screen_name"),
        gender: Gender::Unknown,
        picture: str_field(profile, "profile_image_url_https")
            .or_else(|| str_field(profile, "profile_image_url")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_google_profile() {
        let user = google(&json!({
            "id": "1089",
            "name": "Jane Doe",
            "given_name": "Jane",
            "email": "jane@example.com",
            "locale": "en",
            "gender": "female",
            "picture": "https://lh3.googleusercontent.com/photo.jpg"
        }))
        .unwrap();

        assert_eq!(user.id, "1089");
        assert_eq!(user.user_name.as_deref(), Some("Jane"));
        assert_eq!(user.gender, Gender::Female);
        assert_eq!(
            user.picture.as_deref(),
            Some("https://lh3.googleusercontent.com/photo.jpg")
        );
    }

    #[test]
    fn test_facebook_picture_from_id() {
        let user = facebook(&json!({"id": "4", "name": "Mark", "gender": "male"})).unwrap();
        assert_eq!(
            user.picture.as_deref(),
            Some("https://graph.facebook.com/4/picture")
        );
        assert_eq!(user.gender, Gender::Male);
    }

    #[test]
    fn test_github_numeric_id() {
        let user = github(&json!({
            "id": 583231,
            "login": "octocat",
            "name": "The Octocat",
            "email": null,
            "avatar_url": "https://avatars.githubusercontent.com/u/583231"
        }))
        .unwrap();

        assert_eq!(user.id, "583231");
        assert_eq!(user.user_name.as_deref(), Some("octocat"));
        assert_eq!(user.email, None);
    }

    #[test]
    fn test_windows_live_preferred_email() {
        let user = windows_live(&json!({
            "id": "8c8ce076ca27823f",
            "name": "Roberto Tamburello",
            "emails": {"preferred": "roberto@contoso.com", "account": "rob@live.com"},
            "locale": "en_US"
        }))
        .unwrap();

        assert_eq!(user.email.as_deref(), Some("roberto@contoso.com"));
        assert_eq!(user.locale.as_deref(), Some("en_US"));
    }

    #[test]
    fn test_arcgis_username_is_id() {
        let user = arcgis(&json!({"username": "jdoe_esri", "fullName": "J Doe", "culture": "en"}))
            .unwrap();
        assert_eq!(user.id, "jdoe_esri");
        assert_eq!(user.user_name.as_deref(), Some("jdoe_esri"));
    }

    #[test]
    fn test_instagram_data_envelope() {
        let user = instagram(&json!({
            "data": {"id": "1574083", "username": "snoopdogg", "full_name": "Snoop Dogg"}
        }))
        .unwrap();
        assert_eq!(user.id, "1574083");
        assert_eq!(user.name.as_deref(), Some("Snoop Dogg"));

        let err = instagram(&json!({"meta": {"code": 400}})).unwrap_err();
        assert_eq!(
            err.error_kind,
            ErrorKind::OAuth(OAuthErrorKind::InvalidResponse)
        );
    }

    #[test]
    fn test_thirty_seven_signals_identity() {
        let user = thirty_seven_signals(&json!({
            "identity": {
                "id": 9999999,
                "first_name": "Jason",
                "last_name": "Fried",
                "email_address": "jason@37signals.com"
            }
        }))
        .unwrap();

        assert_eq!(user.id, "9999999");
        assert_eq!(user.name.as_deref(), Some("Jason Fried"));
        assert_eq!(user.email.as_deref(), Some("jason@37signals.com"));
    }

    #[test]
    fn test_twitter_profile() {
        let user = twitter(&json!({
            "id": 38895958,
            "id_str": "38895958",
            "name": "Sean Cook",
            "screen_name": "theSeanCook",
            "lang": "en",
            "profile_image_url_https": "https://pbs.twimg.com/normal.jpeg"
        }))
        .unwrap();

        assert_eq!(user.id, "38895958");
        assert_eq!(user.user_name.as_deref(), Some("theSeanCook"));
        assert_eq!(user.locale.as_deref(), Some("en"));
    }

    #[test]
    fn test_missing_id_is_rejected() {
        let err = amazon(&json!({"name": "No Id"})).unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::OAuth(OAuthErrorKind::MissingField));
    }
}
