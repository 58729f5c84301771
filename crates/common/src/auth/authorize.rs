//! Authorization and end-session URL building

use pkce_auth_domain::constants::{CODE_CHALLENGE_METHOD, RESPONSE_MODE, RESPONSE_TYPE};
use pkce_auth_domain::{AuthSettings, AuthorizationRequest, Result};
use url::Url;

use super::pkce::PkceChallenge;

/// Build a fresh authorization request for `settings`
///
/// Generates a new state and code verifier and embeds the S256 challenge in
/// the authorization URL. Nothing is persisted: the caller stores `state` and
/// `code_verifier` before navigating to `authorization_url`.
///
/// # Errors
/// Returns `AuthError::Configuration` if secure random generation fails
pub fn build_authorization_request(settings: &AuthSettings) -> Result<AuthorizationRequest> {
    let challenge = PkceChallenge::generate()?;

    let params = [
        ("client_id", settings.client_id.as_str()),
        ("response_type", RESPONSE_TYPE),
        ("redirect_uri", settings.redirect_uri.as_str()),
        ("response_mode", RESPONSE_MODE),
        ("scope", settings.scope.as_str()),
        ("state", challenge.state.as_str()),
        ("code_challenge", challenge.code_challenge.as_str()),
        ("code_challenge_method", CODE_CHALLENGE_METHOD),
    ];
    let authorization_url = append_query(&settings.endpoints.authorization_endpoint, &params);

    Ok(AuthorizationRequest {
        state: challenge.state,
        code_verifier: challenge.code_verifier,
        authorization_url,
    })
}

/// Provider logout URL that returns the user to `logout_success_uri`.
#[must_use]
pub fn end_session_url(settings: &AuthSettings) -> Url {
    append_query(
        &settings.endpoints.end_session_endpoint,
        &[("post_logout_redirect_uri", settings.logout_success_uri.as_str())],
    )
}

// Values are percent-encoded per RFC 3986 (space as %20); any query already
// on the endpoint is kept in front.
fn append_query(base: &Url, params: &[(&str, &str)]) -> Url {
    let encoded = params
        .iter()
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");

    let query = match base.query() {
        Some(existing) if !existing.is_empty() => format!("{existing}&{encoded}"),
        _ => encoded,
    };

    let mut url = base.clone();
    url.set_query(Some(&query));
    url
}

#[cfg(test)]
mod tests {
    //! Unit tests for auth::authorize.
    use std::collections::HashMap;

    use pkce_auth_domain::AuthEndpoints;

    use super::*;
    use crate::auth::pkce::generate_code_challenge;

    fn settings(authorization_endpoint: &str) -> AuthSettings {
        AuthSettings::new(
            AuthEndpoints {
                authorization_endpoint: Url::parse(authorization_endpoint).unwrap(),
                token_endpoint: Url::parse("https://idp.test/token").unwrap(),
                end_session_endpoint: Url::parse("https://idp.test/logout").unwrap(),
            },
            "web client",
            Url::parse("https://app.test/callback?tenant=a&b=1").unwrap(),
            Url::parse("https://app.test/signed-out").unwrap(),
            "openid profile",
        )
    }

    fn query_map(url: &Url) -> HashMap<String, String> {
        url.query_pairs().into_owned().collect()
    }

    /// Validates `build_authorization_request` behavior for the authorization
    /// url parameters scenario.
    ///
    /// Assertions:
    /// - Confirms exactly the eight protocol parameters are present.
    /// - Confirms `code_challenge` is the S256 transform of the returned
    ///   verifier.
    /// - Confirms `state` in the URL equals the returned state.
    #[test]
    fn test_authorization_url_parameters() {
        let request = build_authorization_request(&settings("https://idp.test/authorize")).unwrap();
        let params = query_map(&request.authorization_url);

        assert_eq!(params.len(), 8);
        assert_eq!(params["client_id"], "web client");
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["redirect_uri"], "https://app.test/callback?tenant=a&b=1");
        assert_eq!(params["response_mode"], "query");
        assert_eq!(params["scope"], "openid profile");
        assert_eq!(params["state"], request.state);
        assert_eq!(params["code_challenge"], generate_code_challenge(&request.code_verifier));
        assert_eq!(params["code_challenge_method"], "S256");
    }

    /// Validates `build_authorization_request` behavior for the percent
    /// encoding scenario.
    ///
    /// Assertions:
    /// - Ensures spaces are encoded as `%20` and reserved characters in the
    ///   redirect URI are escaped.
    #[test]
    fn test_values_are_percent_encoded() {
        let request = build_authorization_request(&settings("https://idp.test/authorize")).unwrap();
        let query = request.authorization_url.query().unwrap();

        assert!(query.contains("scope=openid%20profile"));
        assert!(query.contains("client_id=web%20client"));
        assert!(query.contains(
            "redirect_uri=https%3A%2F%2Fapp.test%2Fcallback%3Ftenant%3Da%26b%3D1"
        ));
    }

    /// Validates `build_authorization_request` behavior for the existing
    /// endpoint query scenario.
    #[test]
    fn test_existing_endpoint_query_is_preserved() {
        let request =
            build_authorization_request(&settings("https://idp.test/authorize?p=signin")).unwrap();
        let params = query_map(&request.authorization_url);

        assert_eq!(params["p"], "signin");
        assert_eq!(params.len(), 9);
        assert!(request.authorization_url.query().unwrap().starts_with("p=signin&"));
    }

    /// Validates `build_authorization_request` behavior for the fresh state
    /// per request scenario.
    #[test]
    fn test_each_request_is_fresh() {
        let settings = settings("https://idp.test/authorize");
        let first = build_authorization_request(&settings).unwrap();
        let second = build_authorization_request(&settings).unwrap();

        assert_ne!(first.state, second.state);
        assert_ne!(first.code_verifier, second.code_verifier);
        assert_eq!(first.code_verifier.len(), 128);
    }

    #[test]
    fn test_end_session_url() {
        let url = end_session_url(&settings("https://idp.test/authorize"));

        assert_eq!(
            url.as_str(),
            "https://idp.test/logout?post_logout_redirect_uri=https%3A%2F%2Fapp.test%2Fsigned-out"
        );
    }
}
