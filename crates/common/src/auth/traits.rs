//! Ports for the authorization core
//!
//! These traits enable dependency injection and testing by abstracting the
//! external dependencies of the flow: the token endpoint, key/value storage,
//! navigation of the embedding application, and wall-clock time.

use async_trait::async_trait;
use pkce_auth_domain::{Result, TokenSet};
use url::Url;

/// Trait for token endpoint operations
///
/// Abstracts the two grants so the orchestrator and callback validator can be
/// exercised against mock implementations.
#[async_trait]
pub trait TokenExchange: Send + Sync {
    /// Exchange an authorization code for tokens
    ///
    /// # Arguments
    /// * `code` - Authorization code from the redirect callback
    /// * `code_verifier` - Verifier stored with the pending request
    ///
    /// # Errors
    /// Returns `AuthError::Exchange` if the endpoint rejects the grant or
    /// answers with a malformed body
    async fn exchange_code(&self, code: &str, code_verifier: &str) -> Result<TokenSet>;

    /// Obtain a new access token for `scope` using a refresh token
    ///
    /// # Errors
    /// Returns `AuthError::NoRefreshToken` for an empty refresh token, or
    /// `AuthError::Exchange` if the refresh fails
    async fn exchange_refresh_token(&self, refresh_token: &str, scope: &str) -> Result<TokenSet>;
}

/// Trait for synchronous string key/value storage
///
/// Backends decide persistence: in-memory stores model session-scoped storage,
/// file-backed stores model persistent storage.
pub trait KeyValueStorage: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    /// Returns `AuthError::Storage` if the backend cannot be read
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    /// Returns `AuthError::Storage` if the backend cannot be written
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    /// Returns `AuthError::Storage` if the backend cannot be written
    fn remove_item(&self, key: &str) -> Result<()>;
}

/// Navigation capability of the embedding application
pub trait Navigator: Send + Sync {
    /// Location the user is currently on (restored after login).
    fn current_location(&self) -> Url;

    /// Navigate to `url`, adding a history entry.
    fn navigate(&self, url: &Url);

    /// Navigate to `url`, replacing the current history entry.
    fn replace(&self, url: &Url);
}

/// Wall-clock source used for token expiry decisions
pub trait Clock: Send + Sync {
    /// Current time in unix seconds.
    fn now_unix(&self) -> i64;
}

/// Real system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}
