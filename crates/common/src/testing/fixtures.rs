//! Test fixture generators
//!
//! Unsigned JWTs and settings pointing at a test provider. Tokens are built
//! with `alg: none`; the core never verifies signatures.

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use pkce_auth_domain::{AuthEndpoints, AuthSettings, TokenSet};
use serde_json::json;
use url::Url;

/// Client id used by [`test_settings`].
pub const TEST_CLIENT_ID: &str = "test-client";

/// Default scope used by [`test_settings`].
pub const TEST_SCOPE: &str = "openid profile";

/// Encode `claims` as an unsigned compact JWT.
///
/// # Examples
///
/// ```
/// use pkce_auth_common::testing::fixtures::unsigned_jwt;
///
/// let token = unsigned_jwt(&serde_json::json!({"exp": 1}));
/// assert_eq!(token.split('.').count(), 3);
/// ```
pub fn unsigned_jwt(claims: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.")
}

/// Access token for `client_id` expiring at `exp`; `label` keeps tokens with
/// the same expiry distinct.
pub fn access_token_jwt(label: &str, exp: i64, client_id: &str) -> String {
    unsigned_jwt(&json!({ "jti": label, "exp": exp, "azp": client_id }))
}

/// ID token carrying the profile claims the cache reads.
pub fn id_token_jwt(email: &str, given_name: &str, family_name: &str) -> String {
    unsigned_jwt(&json!({
        "email": email,
        "given_name": given_name,
        "family_name": family_name,
        "roles": ["user"],
    }))
}

/// Token set for [`TEST_CLIENT_ID`] whose access token expires at `exp`.
pub fn token_set(label: &str, scope: &str, exp: i64) -> TokenSet {
    TokenSet::new(
        access_token_jwt(label, exp, TEST_CLIENT_ID),
        id_token_jwt("ada@example.com", "Ada", "Lovelace"),
        format!("refresh-{label}"),
        scope,
    )
}

/// Settings for a provider rooted at `provider_base` (e.g. a wiremock URI).
///
/// Endpoints are `{base}/authorize`, `{base}/token` and `{base}/logout`.
///
/// # Panics
/// Panics if `provider_base` is not a valid URL.
pub fn test_settings(provider_base: &str) -> AuthSettings {
    let base = provider_base.trim_end_matches('/');
    let endpoint = |path: &str| {
        Url::parse(&format!("{base}/{path}")).expect("provider base must be a valid URL")
    };

    AuthSettings::new(
        AuthEndpoints {
            authorization_endpoint: endpoint("authorize"),
            token_endpoint: endpoint("token"),
            end_session_endpoint: endpoint("logout"),
        },
        TEST_CLIENT_ID,
        Url::parse("https://app.test/callback").expect("static URL"),
        Url::parse("https://app.test/signed-out").expect("static URL"),
        TEST_SCOPE,
    )
}

/// [`test_settings`] wrapped for sharing.
pub fn shared_settings(provider_base: &str) -> Arc<AuthSettings> {
    Arc::new(test_settings(provider_base))
}
