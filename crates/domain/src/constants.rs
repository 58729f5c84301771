//! Protocol constants
//!
//! Centralized location for the values the authorization flow depends on.

// PKCE / request generation
pub const CODE_VERIFIER_LENGTH: usize = 128;
pub const STATE_LENGTH: usize = 21;
pub const CODE_CHALLENGE_METHOD: &str = "S256";
pub const RESPONSE_TYPE: &str = "code";
pub const RESPONSE_MODE: &str = "query";

// Token endpoint grant types
pub const GRANT_TYPE_AUTHORIZATION_CODE: &str = "authorization_code";
pub const GRANT_TYPE_REFRESH_TOKEN: &str = "refresh_token";

/// Seconds of remaining lifetime below which a cached access token is
/// refreshed instead of returned.
pub const REFRESH_THRESHOLD_SECONDS: i64 = 60;

// Storage keys (prefixed with `<cache_prefix>:` when a prefix is configured)
pub const AUTH_CACHE_KEY: &str = "auth";
pub const AUTH_REQUEST_KEY: &str = "auth:request";

// Callback errors raised locally
pub const INVALID_STATE_ERROR: &str = "Invalid State";
pub const INVALID_STATE_DESCRIPTION: &str =
    "State received does not match the previously generated state.";
pub const EXCHANGE_FAILED_ERROR: &str = "Exchange Failed";
