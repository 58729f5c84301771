//! Authorization request and callback types

use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants::{EXCHANGE_FAILED_ERROR, INVALID_STATE_DESCRIPTION, INVALID_STATE_ERROR};
use crate::errors::AuthError;

/// Output of the authorization request builder
///
/// The caller persists `state` and `code_verifier` (as a
/// [`PendingAuthRequest`]) before navigating to `authorization_url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    pub state: String,
    pub code_verifier: String,
    pub authorization_url: Url,
}

/// Login in progress, waiting for the provider callback
///
/// Lives in session-scoped storage only and is consumed by exactly one
/// callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingAuthRequest {
    pub state: String,
    pub code_verifier: String,
    pub login_success_redirect_uri: Url,
}

/// Error reported to the embedding application after a callback
///
/// Not persisted. Compared by value so repeated deliveries of the same
/// provider error can be ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackError {
    pub error: String,
    pub error_description: String,
}

impl CallbackError {
    #[must_use]
    pub fn new(error: impl Into<String>, error_description: impl Into<String>) -> Self {
        Self { error: error.into(), error_description: error_description.into() }
    }

    /// The error raised when the callback state does not match.
    #[must_use]
    pub fn invalid_state() -> Self {
        Self::new(INVALID_STATE_ERROR, INVALID_STATE_DESCRIPTION)
    }
}

impl std::fmt::Display for CallbackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.error_description)
    }
}

impl From<&AuthError> for CallbackError {
    fn from(err: &AuthError) -> Self {
        match err {
            AuthError::StateMismatch => Self::invalid_state(),
            AuthError::Provider { error, description } => Self::new(error, description),
            other => Self::new(EXCHANGE_FAILED_ERROR, other.to_string()),
        }
    }
}
