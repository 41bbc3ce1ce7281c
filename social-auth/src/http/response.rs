//! Response helpers shared by the provider flows.

use std::collections::HashMap;

use tracing::warn;

use crate::error::{http_error, Error, HttpErrorKind};

/// Longest response excerpt carried in an error message.
const MAX_ERROR_BODY: usize = 512;

/// Read the body of a successful response, or fail with the status and an excerpt of the body.
///
/// # Arguments
///
/// * `response` - Response from the provider
/// * `operation` - Short description used in logs and errors, e.g. "Google token exchange"
pub async fn read_success_body(response: reqwest::Response, operation: &str) -> Result<String, Error> {
    let status = response.status();
    let body = response.text().await?;

    if status.is_success() {
        return Ok(body);
    }

    let excerpt: String = body.chars().take(MAX_ERROR_BODY).collect();
    warn!("{} failed with status {}: {}", operation, status, excerpt);
    Err(http_error(
        HttpErrorKind::Status(status.as_u16()),
        &format!("{} returned {}: {}", operation, status, excerpt),
    ))
}

/// Decode an `application/x-www-form-urlencoded` body.
pub fn parse_form(body: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(body.trim().as_bytes())
        .into_owned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_form() {
        let form = parse_form("oauth_token=abc&oauth_token_secret=d%2Fe&oauth_callback_confirmed=true\n");
        assert_eq!(form.get("oauth_token").map(String::as_str), Some("abc"));
        assert_eq!(form.get("oauth_token_secret").map(String::as_str), Some("d/e"));
        assert_eq!(form.get("oauth_callback_confirmed").map(String::as_str), Some("true"));
    }

    #[test]
    fn test_parse_form_empty() {
        assert!(parse_form("").is_empty());
    }
}
