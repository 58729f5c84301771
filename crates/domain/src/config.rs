//! Session settings supplied once by the embedding application

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants::{AUTH_CACHE_KEY, AUTH_REQUEST_KEY};
use crate::errors::{AuthError, Result};
use crate::impl_domain_enum_conversions;

/// Where the durable `AuthCache` record is kept
///
/// The pending authorization request ignores this setting and always lives in
/// session-scoped storage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheStrategy {
    /// Survives restarts of the embedding application
    #[default]
    #[serde(alias = "localStorage", alias = "local_storage")]
    Persistent,
    /// Dropped when the session (process) ends
    #[serde(alias = "sessionStorage", alias = "session_storage", alias = "session")]
    SessionScoped,
}

impl_domain_enum_conversions!(CacheStrategy {
    Persistent => "persistent" | "localstorage" | "local_storage",
    SessionScoped => "session_scoped" | "sessionstorage" | "session_storage" | "session",
});

/// Provider endpoints used by the flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthEndpoints {
    pub authorization_endpoint: Url,
    pub token_endpoint: Url,
    pub end_session_endpoint: Url,
}

/// Immutable settings for one authorization session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSettings {
    pub endpoints: AuthEndpoints,
    pub client_id: String,
    pub redirect_uri: Url,
    pub logout_success_uri: Url,
    /// Space-delimited default scope list
    pub scope: String,
    #[serde(default)]
    pub cache_strategy: CacheStrategy,
    #[serde(default)]
    pub cache_prefix: String,
}

impl AuthSettings {
    /// Create settings with the default cache strategy and no cache prefix.
    #[must_use]
    pub fn new(
        endpoints: AuthEndpoints,
        client_id: impl Into<String>,
        redirect_uri: Url,
        logout_success_uri: Url,
        scope: impl Into<String>,
    ) -> Self {
        Self {
            endpoints,
            client_id: client_id.into(),
            redirect_uri,
            logout_success_uri,
            scope: scope.into(),
            cache_strategy: CacheStrategy::default(),
            cache_prefix: String::new(),
        }
    }

    #[must_use]
    pub fn with_cache_strategy(mut self, strategy: CacheStrategy) -> Self {
        self.cache_strategy = strategy;
        self
    }

    #[must_use]
    pub fn with_cache_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.cache_prefix = prefix.into();
        self
    }

    /// Storage key of the persisted `AuthCache` record.
    #[must_use]
    pub fn auth_cache_key(&self) -> String {
        self.prefixed(AUTH_CACHE_KEY)
    }

    /// Storage key of the pending authorization request record.
    #[must_use]
    pub fn auth_request_key(&self) -> String {
        self.prefixed(AUTH_REQUEST_KEY)
    }

    fn prefixed(&self, key: &str) -> String {
        if self.cache_prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}:{}", self.cache_prefix, key)
        }
    }

    /// Check the settings before a session is built on them.
    ///
    /// # Errors
    /// Returns `AuthError::Configuration` if the client id or scope is blank,
    /// or if an endpoint is not an http(s) URL.
    pub fn validate(&self) -> Result<()> {
        if self.client_id.trim().is_empty() {
            return Err(AuthError::Configuration("client_id must not be empty".to_string()));
        }
        if self.scope.trim().is_empty() {
            return Err(AuthError::Configuration("scope must not be empty".to_string()));
        }

        let endpoints = [
            ("authorization_endpoint", &self.endpoints.authorization_endpoint),
            ("token_endpoint", &self.endpoints.token_endpoint),
            ("end_session_endpoint", &self.endpoints.end_session_endpoint),
        ];
        for (name, url) in endpoints {
            if !matches!(url.scheme(), "http" | "https") {
                return Err(AuthError::Configuration(format!(
                    "{name} must be an http(s) URL, got {url}"
                )));
            }
        }

        Ok(())
    }
}

/// Log output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), json: false }
    }
}

/// Complete configuration of an application embedding the authorization core
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub auth: AuthSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// File backing the persistent store; in-memory when absent
    #[serde(default)]
    pub storage_path: Option<PathBuf>,
    /// Token endpoint request timeout; none when absent
    #[serde(default)]
    pub request_timeout_seconds: Option<u64>,
}

impl Config {
    /// # Errors
    /// Returns `AuthError::Configuration` if the auth settings are invalid,
    /// the log level is blank or the request timeout is zero.
    pub fn validate(&self) -> Result<()> {
        self.auth.validate()?;

        if self.logging.level.trim().is_empty() {
            return Err(AuthError::Configuration("logging.level must not be empty".to_string()));
        }
        if self.request_timeout_seconds == Some(0) {
            return Err(AuthError::Configuration(
                "request_timeout_seconds must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
