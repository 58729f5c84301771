//! Error types used throughout the authorization core

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the authorization core
///
/// Every failure of the flow maps to one of these variants. Only
/// `Configuration` is fatal; the others are recovered by the orchestrator
/// (login redirect), surfaced as a callback error, or resolved by discarding
/// local state.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "details")]
pub enum AuthError {
    /// Invalid settings or an unusable platform (e.g. no CSPRNG)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A JWT could not be decoded into claims
    #[error("Decoding error: {0}")]
    Decoding(String),

    /// Callback `state` did not match the pending request
    #[error("State received does not match the previously generated state")]
    StateMismatch,

    /// The provider redirected back with `error` / `error_description`
    #[error("Provider error: {error}: {description}")]
    Provider { error: String, description: String },

    /// The token endpoint rejected the grant or answered with garbage
    #[error("Token exchange failed: {message}")]
    Exchange { status: Option<u16>, message: String },

    /// A refresh was needed but no refresh token is cached
    #[error("No refresh token available")]
    NoRefreshToken,

    /// The storage backend failed or held corrupt data
    #[error("Storage error: {0}")]
    Storage(String),

    /// A login redirect was started; no token is available in this call
    #[error("Login required: redirecting to the authorization endpoint")]
    LoginRequired,
}

impl AuthError {
    /// Build an exchange error from an HTTP status and a message.
    #[must_use]
    pub fn exchange(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Exchange { status, message: message.into() }
    }

    /// `false` only for errors that must stop the embedding application.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Configuration(_))
    }

    /// Errors after which the only way forward is a fresh interactive login.
    #[must_use]
    pub const fn requires_login(&self) -> bool {
        matches!(
            self,
            Self::Exchange { .. }
                | Self::NoRefreshToken
                | Self::Decoding(_)
                | Self::Storage(_)
                | Self::LoginRequired
        )
    }
}

/// Result type alias for authorization operations
pub type Result<T> = std::result::Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_is_not_recoverable() {
        assert!(!AuthError::Configuration("no rng".to_string()).is_recoverable());
        assert!(AuthError::StateMismatch.is_recoverable());
        assert!(AuthError::exchange(Some(400), "invalid_grant").is_recoverable());
    }

    #[test]
    fn test_requires_login() {
        assert!(AuthError::exchange(Some(401), "expired").requires_login());
        assert!(AuthError::NoRefreshToken.requires_login());
        assert!(AuthError::Decoding("bad jwt".to_string()).requires_login());
        assert!(!AuthError::StateMismatch.requires_login());
        assert!(!AuthError::Configuration("x".to_string()).requires_login());
    }

    #[test]
    fn test_display_messages() {
        let err = AuthError::Provider {
            error: "access_denied".to_string(),
            description: "User cancelled".to_string(),
        };
        assert_eq!(err.to_string(), "Provider error: access_denied: User cancelled");

        let err = AuthError::exchange(Some(400), "invalid_grant: token revoked");
        assert_eq!(err.to_string(), "Token exchange failed: invalid_grant: token revoked");
    }

    #[test]
    fn test_serializes_with_type_tag() {
        let json = serde_json::to_value(AuthError::Storage("corrupt".to_string())).unwrap();
        assert_eq!(json["type"], "Storage");
        assert_eq!(json["details"], "corrupt");
    }
}
