//! OAuth 2.0 token endpoint client
//!
//! Handles the two grants the flow needs:
//! - authorization code exchange (with PKCE verifier)
//! - token refresh
//!
//! Both POST `application/x-www-form-urlencoded` bodies to the configured
//! token endpoint and fail with `AuthError::Exchange` on any non-success
//! status or malformed body.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pkce_auth_domain::constants::{GRANT_TYPE_AUTHORIZATION_CODE, GRANT_TYPE_REFRESH_TOKEN};
use pkce_auth_domain::{AuthError, AuthSettings, Result, TokenSet};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::traits::TokenExchange;

/// Successful token endpoint response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// RFC 6749 §5.2 error body
#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

impl TokenErrorResponse {
    fn message(self) -> String {
        match self.error_description {
            Some(description) if !description.is_empty() => {
                format!("{}: {description}", self.error)
            }
            _ => self.error,
        }
    }
}

/// Token endpoint client backed by `reqwest`
///
/// Works with any standard OAuth 2.0 / OIDC provider. Implements RFC 6749
/// (OAuth 2.0) and RFC 7636 (PKCE) for public clients: no client secret is
/// ever sent.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    settings: Arc<AuthSettings>,
    http: Client,
}

impl OAuthClient {
    /// Create a client with no request timeout.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use pkce_auth_common::auth::OAuthClient;
    /// use pkce_auth_domain::{AuthEndpoints, AuthSettings};
    /// use url::Url;
    ///
    /// let settings = AuthSettings::new(
    ///     AuthEndpoints {
    ///         authorization_endpoint: Url::parse("https://idp.example.com/authorize").unwrap(),
    ///         token_endpoint: Url::parse("https://idp.example.com/token").unwrap(),
    ///         end_session_endpoint: Url::parse("https://idp.example.com/logout").unwrap(),
    ///     },
    ///     "client_id",
    ///     Url::parse("http://localhost:3000/callback").unwrap(),
    ///     Url::parse("http://localhost:3000/").unwrap(),
    ///     "openid profile",
    /// );
    /// let client = OAuthClient::new(Arc::new(settings));
    /// ```
    #[must_use]
    pub fn new(settings: Arc<AuthSettings>) -> Self {
        Self { settings, http: Client::new() }
    }

    /// Create a client whose requests give up after `timeout`.
    ///
    /// # Errors
    /// Returns `AuthError::Configuration` if the HTTP client cannot be built
    pub fn with_timeout(settings: Arc<AuthSettings>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { settings, http })
    }

    #[must_use]
    pub fn settings(&self) -> &AuthSettings {
        &self.settings
    }

    /// Exchange an authorization code for tokens
    ///
    /// # Arguments
    /// * `code` - Authorization code from redirect callback
    /// * `code_verifier` - Verifier generated with the authorization request
    ///
    /// # Returns
    /// `TokenSet` for the configured scope; `refresh_token` is empty if the
    /// provider issued none
    ///
    /// # Errors
    /// Returns `AuthError::Exchange` if:
    /// - the request cannot be sent
    /// - the endpoint answers with a non-success status
    /// - `access_token` or `id_token` is missing from the response
    pub async fn exchange_code(&self, code: &str, code_verifier: &str) -> Result<TokenSet> {
        let scope = self.settings.scope.as_str();
        let params = [
            ("client_id", self.settings.client_id.as_str()),
            ("scope", scope),
            ("code", code),
            ("redirect_uri", self.settings.redirect_uri.as_str()),
            ("grant_type", GRANT_TYPE_AUTHORIZATION_CODE),
            ("code_verifier", code_verifier),
        ];

        let response = self.post_form(GRANT_TYPE_AUTHORIZATION_CODE, &params).await?;
        let access_token = required(response.access_token, "access_token")?;
        let id_token = required(response.id_token, "id_token")?;

        debug!(scope, "Authorization code exchanged");
        Ok(TokenSet::new(access_token, id_token, response.refresh_token.unwrap_or_default(), scope))
    }

    /// Refresh the access token for `scope`
    ///
    /// When the provider does not rotate refresh tokens, the token that was
    /// sent is returned in the `TokenSet`. A missing `id_token` is returned
    /// as an empty string so the cache keeps the previous one.
    ///
    /// # Errors
    /// Returns `AuthError::NoRefreshToken` for an empty `refresh_token`
    /// (no request is sent), or `AuthError::Exchange` as for
    /// [`exchange_code`](Self::exchange_code)
    pub async fn exchange_refresh_token(&self, refresh_token: &str, scope: &str) -> Result<TokenSet> {
        if refresh_token.is_empty() {
            return Err(AuthError::NoRefreshToken);
        }

        let params = [
            ("client_id", self.settings.client_id.as_str()),
            ("scope", scope),
            ("refresh_token", refresh_token),
            ("grant_type", GRANT_TYPE_REFRESH_TOKEN),
        ];

        let response = self.post_form(GRANT_TYPE_REFRESH_TOKEN, &params).await?;
        let access_token = required(response.access_token, "access_token")?;
        let rotated = response.refresh_token.filter(|token| !token.is_empty());

        debug!(scope, rotated = rotated.is_some(), "Access token refreshed");
        Ok(TokenSet::new(
            access_token,
            response.id_token.unwrap_or_default(),
            rotated.unwrap_or_else(|| refresh_token.to_string()),
            scope,
        ))
    }

    async fn post_form(&self, grant_type: &str, params: &[(&str, &str)]) -> Result<TokenResponse> {
        let endpoint = self.settings.endpoints.token_endpoint.clone();
        let response = self.http.post(endpoint).form(params).send().await.map_err(|e| {
            warn!(grant_type, error = %e, "Token request failed");
            AuthError::exchange(None, format!("token request failed: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<TokenErrorResponse>(&body)
                .map(TokenErrorResponse::message)
                .unwrap_or_else(|_| format!("token endpoint returned {status}"));
            warn!(grant_type, status = status.as_u16(), %message, "Token endpoint rejected grant");
            return Err(AuthError::exchange(Some(status.as_u16()), message));
        }

        response.json::<TokenResponse>().await.map_err(|e| {
            warn!(grant_type, error = %e, "Malformed token response");
            AuthError::exchange(None, format!("malformed token response: {e}"))
        })
    }
}

fn required(value: Option<String>, field: &str) -> Result<String> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AuthError::exchange(None, format!("token response missing {field}")))
}

#[async_trait]
impl TokenExchange for OAuthClient {
    async fn exchange_code(&self, code: &str, code_verifier: &str) -> Result<TokenSet> {
        Self::exchange_code(self, code, code_verifier).await
    }

    async fn exchange_refresh_token(&self, refresh_token: &str, scope: &str) -> Result<TokenSet> {
        Self::exchange_refresh_token(self, refresh_token, scope).await
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for auth::client.
    use pkce_auth_domain::AuthEndpoints;
    use url::Url;

    use super::*;

    fn create_test_settings() -> Arc<AuthSettings> {
        Arc::new(AuthSettings::new(
            AuthEndpoints {
                authorization_endpoint: Url::parse("https://idp.test/authorize").unwrap(),
                // Port 9 (discard) is never listened on in test environments
                token_endpoint: Url::parse("http://127.0.0.1:9/token").unwrap(),
                end_session_endpoint: Url::parse("https://idp.test/logout").unwrap(),
            },
            "test_client_id",
            Url::parse("http://localhost:3000/callback").unwrap(),
            Url::parse("http://localhost:3000/").unwrap(),
            "openid profile",
        ))
    }

    /// Validates `OAuthClient::exchange_refresh_token` behavior for the empty
    /// refresh token scenario.
    ///
    /// Assertions:
    /// - Ensures `matches!(result, Err(AuthError::NoRefreshToken))` evaluates
    ///   to true.
    #[tokio::test]
    async fn test_refresh_with_empty_token() {
        let client = OAuthClient::new(create_test_settings());

        let result = client.exchange_refresh_token("", "openid").await;
        assert!(matches!(result, Err(AuthError::NoRefreshToken)));
    }

    /// Validates `OAuthClient::exchange_code` behavior for the unreachable
    /// endpoint scenario.
    ///
    /// Assertions:
    /// - Ensures the error is `AuthError::Exchange` without a status.
    #[tokio::test]
    async fn test_unreachable_endpoint_is_exchange_error() {
        let client =
            OAuthClient::with_timeout(create_test_settings(), Duration::from_secs(2)).unwrap();

        let result = client.exchange_code("code", "verifier").await;
        assert!(matches!(result, Err(AuthError::Exchange { status: None, .. })));
    }

    #[test]
    fn test_error_body_message() {
        let body: TokenErrorResponse =
            serde_json::from_str(r#"{"error":"invalid_grant","error_description":"expired"}"#)
                .unwrap();
        assert_eq!(body.message(), "invalid_grant: expired");

        let bare: TokenErrorResponse = serde_json::from_str(r#"{"error":"invalid_grant"}"#).unwrap();
        assert_eq!(bare.message(), "invalid_grant");
    }

    #[test]
    fn test_required_field() {
        assert_eq!(required(Some("x".to_string()), "access_token").unwrap(), "x");
        assert!(matches!(
            required(Some(String::new()), "access_token"),
            Err(AuthError::Exchange { status: None, .. })
        ));
        assert!(required(None, "id_token").unwrap_err().to_string().contains("id_token"));
    }
}
