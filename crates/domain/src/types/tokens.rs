//! Token types
//!
//! `TokenSet` is what one token-endpoint exchange produces. `AuthCache` is the
//! durable session artifact built from successive exchanges: access tokens
//! keyed by scope, plus the latest ID/refresh tokens and the derived user.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::user::UserProfile;

/// Tokens returned by a code or refresh grant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenSet {
    pub access_token: String,
    pub id_token: String,
    /// Empty when the provider issued no refresh token
    pub refresh_token: String,
    /// Scope string the access token was requested for
    pub scope: String,
}

impl TokenSet {
    #[must_use]
    pub fn new(
        access_token: impl Into<String>,
        id_token: impl Into<String>,
        refresh_token: impl Into<String>,
        scope: impl Into<String>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            id_token: id_token.into(),
            refresh_token: refresh_token.into(),
            scope: scope.into(),
        }
    }
}

/// One cached access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenEntry {
    pub token: String,
    /// Unix seconds, taken from the token's own `exp` claim
    pub expire_time: i64,
}

impl AccessTokenEntry {
    /// Seconds left before `expire_time` (negative once expired).
    #[must_use]
    pub const fn seconds_remaining(&self, now: i64) -> i64 {
        self.expire_time - now
    }

    /// `true` while more than `threshold_seconds` of lifetime remain.
    #[must_use]
    pub const fn is_fresh(&self, now: i64, threshold_seconds: i64) -> bool {
        self.seconds_remaining(now) > threshold_seconds
    }
}

/// Durable session artifact, persisted as camelCase JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthCache {
    pub access_tokens: BTreeMap<String, AccessTokenEntry>,
    pub id_token: String,
    pub refresh_token: String,
    pub user: UserProfile,
}

impl AuthCache {
    /// Cached access token for an exact scope string.
    #[must_use]
    pub fn access_token_for(&self, scope: &str) -> Option<&AccessTokenEntry> {
        self.access_tokens.get(scope)
    }

    /// Fresh access token for `scope`, if one is cached.
    #[must_use]
    pub fn fresh_token(&self, scope: &str, now: i64, threshold_seconds: i64) -> Option<&str> {
        self.access_token_for(scope)
            .filter(|entry| entry.is_fresh(now, threshold_seconds))
            .map(|entry| entry.token.as_str())
    }
}
