//! Pre-configured provider descriptors.

use super::profiles;
use crate::oauth10::{OAuth1Descriptor, OAuth1Endpoints};
use crate::oauth20::{OAuth2Descriptor, OAuth2Endpoints, TokenPlacement, TokenResponseFormat};

fn oauth2(
    name: &str,
    authorize: &str,
    token: &str,
    user_info: &str,
    map_user: crate::oauth::ProfileMapper,
) -> OAuth2Descriptor {
    OAuth2Descriptor {
        name: name.to_string(),
        endpoints: OAuth2Endpoints {
            authorize: authorize.to_string(),
            token: token.to_string(),
            user_info: user_info.to_string(),
        },
        default_scopes: vec![],
        scope_separator: " ".to_string(),
        token_format: TokenResponseFormat::Json,
        token_placement: TokenPlacement::QueryParameter("access_token".to_string()),
        extra_authorize_params: vec![],
        extra_token_params: vec![],
        map_user,
    }
}

fn scopes(scopes: &[&str]) -> Vec<String> {
    scopes.iter().map(|s| s.to_string()).collect()
}

pub fn google() -> OAuth2Descriptor {
    OAuth2Descriptor {
        default_scopes: scopes(&[
            "https://www.googleapis.com/auth/userinfo.profile",
            "https://www.googleapis.com/auth/userinfo.email",
        ]),
        token_placement: TokenPlacement::Bearer,
        ..oauth2(
            "google",
            "https://accounts.google.com/o/oauth2/auth",
            "https://accounts.google.com/o/oauth2/token",
            "https://www.googleapis.com/oauth2/v2/userinfo",
            profiles::google,
        )
    }
}

pub fn facebook() -> OAuth2Descriptor {
    OAuth2Descriptor {
        default_scopes: scopes(&["email"]),
        scope_separator: ",".to_string(),
        token_format: TokenResponseFormat::FormEncoded,
        ..oauth2(
            "facebook",
            "https://www.facebook.com/dialog/oauth",
            "https://graph.facebook.com/oauth/access_token",
            "https://graph.facebook.com/me?fields=id,name,email,locale,username,gender",
            profiles::facebook,
        )
    }
}

pub fn github() -> OAuth2Descriptor {
    OAuth2Descriptor {
        default_scopes: scopes(&["user:email"]),
        scope_separator: ",".to_string(),
        token_format: TokenResponseFormat::FormEncoded,
        token_placement: TokenPlacement::AuthorizationScheme("token".to_string()),
        ..oauth2(
            "github",
            "https://github.com/login/oauth/authorize",
            "https://github.com/login/oauth/access_token",
            "https://api.github.com/user",
            profiles::github,
        )
    }
}

pub fn linkedin() -> OAuth2Descriptor {
    OAuth2Descriptor {
        default_scopes: scopes(&["r_basicprofile", "r_emailaddress"]),
        token_placement: TokenPlacement::QueryParameter("oauth2_access_token".to_string()),
        ..oauth2(
            "linkedin",
            "https://www.linkedin.com/uas/oauth2/authorization",
            "https://www.linkedin.com/uas/oauth2/accessToken",
            "https://api.linkedin.com/v1/people/~:(id,formatted-name,email-address,picture-url)?format=json",
            profiles::linkedin,
        )
    }
}

pub fn amazon() -> OAuth2Descriptor {
    OAuth2Descriptor {
        default_scopes: scopes(&["profile"]),
        ..oauth2(
            "amazon",
            "https://www.amazon.com/ap/oa",
            "https://api.amazon.com/auth/o2/token",
            "https://api.amazon.com/user/profile",
            profiles::amazon,
        )
    }
}

pub fn windows_live() -> OAuth2Descriptor {
    OAuth2Descriptor {
        default_scopes: scopes(&["wl.signin", "wl.basic", "wl.emails"]),
        ..oauth2(
            "windowslive",
            "https://login.live.com/oauth20_authorize.srf",
            "https://login.live.com/oauth20_token.srf",
            "https://apis.live.net/v5.0/me",
            profiles::windows_live,
        )
    }
}

pub fn arcgis() -> OAuth2Descriptor {
    OAuth2Descriptor {
        token_placement: TokenPlacement::QueryParameter("token".to_string()),
        ..oauth2(
            "arcgis",
            "https://www.arcgis.com/sharing/oauth2/authorize",
            "https://www.arcgis.com/sharing/oauth2/token",
            "https://www.arcgis.com/sharing/rest/community/self?f=json",
            profiles::arcgis,
        )
    }
}

pub fn instagram() -> OAuth2Descriptor {
    OAuth2Descriptor {
        default_scopes: scopes(&["basic"]),
        ..oauth2(
            "instagram",
            "https://api.instagram.com/oauth/authorize",
            "https://api.instagram.com/oauth/access_token",
            "https://api.instagram.com/v1/users/self",
            profiles::instagram,
        )
    }
}

/// 37signals Launchpad, which wants `type=web_server` on both legs.
pub fn thirty_seven_signals() -> OAuth2Descriptor {
    let web_server = vec![("type".to_string(), "web_server".to_string())];
    OAuth2Descriptor {
        token_placement: TokenPlacement::Bearer,
        extra_authorize_params: web_server.clone(),
        extra_token_params: web_server,
        ..oauth2(
            "37signals",
            "https://launchpad.37signals.com/authorization/new",
            "https://launchpad.37signals.com/authorization/token",
            "https://launchpad.37signals.com/authorization.json",
            profiles::thirty_seven_signals,
        )
    }
}

pub fn twitter() -> OAuth1Descriptor {
    OAuth1Descriptor {
        name: "twitter".to_string(),
        endpoints: OAuth1Endpoints {
            request_token: "https://api.twitter.com/oauth/request_token".to_string(),
            authorize: "https://api.twitter.com/oauth/authenticate".to_string(),
            access_token: "https://api.twitter.com/oauth/access_token".to_string(),
            verify_credentials: "https://api.twitter.com/1.1/account/verify_credentials.json"
                .to_string(),
        },
        map_user: profiles::twitter,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_google_config() {
        let config = google();
        assert_eq!(config.name, "google");
        assert_eq!(config.token_placement, TokenPlacement::Bearer);
        assert_eq!(config.default_scopes.len(), 2);
        assert_eq!(config.token_format, TokenResponseFormat::Json);
    }

    #[test]
    fn test_facebook_config() {
        let config = facebook();
        assert_eq!(config.scope_separator, ",");
        assert_eq!(config.token_format, TokenResponseFormat::FormEncoded);
        assert_eq!(
            config.token_placement,
            TokenPlacement::QueryParameter("access_token".to_string())
        );
    }

    #[test]
    fn test_github_config() {
        let config = github();
        assert_eq!(
            config.token_placement,
            TokenPlacement::AuthorizationScheme("token".to_string())
        );
        assert_eq!(config.default_scopes, vec!["user:email".to_string()]);
    }

    #[test]
    fn test_thirty_seven_signals_config() {
        let config = thirty_seven_signals();
        assert_eq!(config.name, "37signals");
        assert_eq!(config.extra_authorize_params, config.extra_token_params);
        assert_eq!(
            config.extra_token_params,
            vec![("type".to_string(), "web_server".to_string())]
        );
    }

    #[test]
    fn test_twitter_config() {
        let config = twitter();
        assert_eq!(config.name, "twitter");
        assert!(config
            .endpoints
            .verify_credentials
            .ends_with("/1.1/account/verify_credentials.json"));
    }
}
