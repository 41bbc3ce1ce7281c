//! Parsing of token endpoint responses, JSON or form-encoded.

use serde_json::{Map, Value};

use crate::error::{oauth_error, oauth_error_from, Error, OAuthErrorKind};
use crate::http::parse_form;
use crate::oauth::AccessToken;

/// Body encoding used by a provider's token endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenResponseFormat {
    Json,
    /// `access_token=…&expires=…`, as Facebook and GitHub answer by default.
    FormEncoded,
}

/// Parse a token endpoint body into an access token.
///
/// A provider-reported `error` fails the exchange; so does a missing `access_token`.
pub fn parse_token_response(body: &str, format: TokenResponseFormat) -> Result<AccessToken, Error> {
    let fields = match format {
        TokenResponseFormat::Json => match serde_json::from_str::<Value>(body) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                return Err(oauth_error(
                    OAuthErrorKind::InvalidResponse,
                    "Token response is not a JSON object",
                ))
            }
            Err(e) => return Err(oauth_error_from(OAuthErrorKind::InvalidResponse, e)),
        },
        TokenResponseFormat::FormEncoded => parse_form(body)
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect(),
    };

    if let Some(error) = fields.get("error") {
        return Err(oauth_error(
            OAuthErrorKind::TokenExchangeFailed,
            &format!("Provider returned an error: {}", describe_error(error, &fields)),
        ));
    }

    let access_token = fields
        .get("access_token")
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            oauth_error(
                OAuthErrorKind::MissingField,
                "Token response has no 'access_token'",
            )
        })?;

    let token = AccessToken::new(access_token.to_string());
    let expires_in = fields
        .get("expires_in")
        .or_else(|| fields.get("expires"))
        .and_then(as_seconds);

    Ok(match expires_in {
        Some(seconds) if seconds > 0 => token.expires_in(seconds),
        _ => token,
    })
}

fn describe_error(error: &Value, fields: &Map<String, Value>) -> String {
    match error {
        Value::String(code) => match fields.get("error_description").and_then(Value::as_str) {
            Some(description) => format!("{} ({})", code, description),
            None => code.clone(),
        },
        // Graph API style: {"error": {"message": "...", "type": "..."}}
        Value::Object(inner) => inner
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string(),
        other => other.to_string(),
    }
}

fn as_seconds(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use secrecy::ExposeSecret;

    #[test]
    fn test_json_token_with_expiry() {
        let token = parse_token_response(
            r#"{"access_token":"ya29.abc","expires_in":3599,"token_type":"Bearer"}"#,
            TokenResponseFormat::Json,
        )
        .unwrap();

        assert_eq!(token.public_token.expose_secret(), "ya29.abc");
        assert!(token.expires_on.is_some());
        assert!(!token.is_expired());
    }

    #[test]
    fn test_form_token_with_string_expiry() {
        let token = parse_token_response(
            "access_token=EAAB%7Cxyz&expires=5183999",
            TokenResponseFormat::FormEncoded,
        )
        .unwrap();

        assert_eq!(token.public_token.expose_secret(), "EAAB|xyz");
        assert!(token.expires_on.is_some());
    }

    #[test]
    fn test_form_token_without_expiry() {
        let token = parse_token_response(
            "access_token=gho_123&scope=user%3Aemail&token_type=bearer",
            TokenResponseFormat::FormEncoded,
        )
        .unwrap();

        assert!(token.expires_on.is_none());
    }

    #[test]
    fn test_out_of_range_expiry_is_ignored() {
        let token = parse_token_response(
            r#"{"access_token":"t","expires_in":9223372036854775807}"#,
            TokenResponseFormat::Json,
        )
        .unwrap();

        assert_eq!(token.public_token.expose_secret(), "t");
        assert!(token.expires_on.is_none());
    }

    #[test]
    fn test_expiry_past_the_calendar_is_ignored() {
        let token = parse_token_response(
            "access_token=t&expires=93000000000000",
            TokenResponseFormat::FormEncoded,
        )
        .unwrap();

        assert!(token.expires_on.is_none());
        assert!(!token.is_expired());
    }

    #[test]
    fn test_missing_access_token() {
        let err = parse_token_response(r#"{"token_type":"Bearer"}"#, TokenResponseFormat::Json)
            .unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::OAuth(OAuthErrorKind::MissingField));
    }

    #[test]
    fn test_provider_error_with_description() {
        let err = parse_token_response(
            "error=bad_verification_code&error_description=The+code+passed+is+incorrect",
            TokenResponseFormat::FormEncoded,
        )
        .unwrap_err();

        assert_eq!(
            err.error_kind,
            ErrorKind::OAuth(OAuthErrorKind::TokenExchangeFailed)
        );
        assert!(err
            .message_chain()
            .contains("bad_verification_code (The code passed is incorrect)"));
    }

    #[test]
    fn test_graph_style_error_object() {
        let err = parse_token_response(
            r#"{"error":{"message":"Invalid verification code format.","type":"OAuthException"}}"#,
            TokenResponseFormat::Json,
        )
        .unwrap_err();

        assert!(err.message_chain().contains("Invalid verification code format."));
    }

    #[test]
    fn test_invalid_json() {
        let err = parse_token_response("access_token=abc", TokenResponseFormat::Json).unwrap_err();
        assert_eq!(
            err.error_kind,
            ErrorKind::OAuth(OAuthErrorKind::InvalidResponse)
        );
    }
}
