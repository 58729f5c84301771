//! Session wiring
//!
//! Turns a loaded [`Config`] into a ready [`AuthService`]: the persistent
//! store is a [`FileStorage`] when `storage_path` is set and in-memory
//! otherwise, the session-scoped store is always in-memory, and the token
//! endpoint client honors `request_timeout_seconds`.

use std::sync::Arc;
use std::time::Duration;

use pkce_auth_common::auth::{
    AuthService, AuthStorage, KeyValueStorage, MemoryStorage, Navigator, OAuthClient,
};
use pkce_auth_domain::{Config, Result};

use crate::storage::FileStorage;

/// Build the storage adapter described by `config`.
#[must_use]
pub fn build_storage(config: &Config) -> AuthStorage {
    let persistent: Arc<dyn KeyValueStorage> = match &config.storage_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "Using file-backed persistent storage");
            Arc::new(FileStorage::new(path.clone()))
        }
        None => Arc::new(MemoryStorage::new()),
    };

    AuthStorage::new(&config.auth, persistent, Arc::new(MemoryStorage::new()))
}

/// Build the token endpoint client described by `config`.
///
/// # Errors
/// Returns `AuthError::Configuration` if the HTTP client cannot be built
pub fn build_client(config: &Config) -> Result<OAuthClient> {
    let settings = Arc::new(config.auth.clone());
    match config.request_timeout_seconds {
        Some(seconds) => OAuthClient::with_timeout(settings, Duration::from_secs(seconds)),
        None => Ok(OAuthClient::new(settings)),
    }
}

/// Build an [`AuthService`] for `config` that navigates through `navigator`.
///
/// # Errors
/// Returns `AuthError::Configuration` if `config` is invalid or the HTTP
/// client cannot be built
pub fn build_service<N>(config: &Config, navigator: Arc<N>) -> Result<AuthService<OAuthClient, N>>
where
    N: Navigator + 'static,
{
    config.validate()?;

    let client = build_client(config)?;
    let storage = build_storage(config);

    tracing::info!(
        client_id = %config.auth.client_id,
        cache_strategy = %config.auth.cache_strategy,
        persistent_file = config.storage_path.is_some(),
        "Authorization session configured"
    );

    AuthService::new(Arc::new(config.auth.clone()), storage, Arc::new(client), navigator)
}
