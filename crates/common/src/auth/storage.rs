//! Storage adapter for the authorization core
//!
//! `AuthStorage` maps the two records of the flow onto injected
//! [`KeyValueStorage`] backends:
//!
//! - the `AuthCache` record goes to the persistent or the session store,
//!   depending on [`CacheStrategy`];
//! - the pending authorization request always goes to the session store.
//!
//! Records that fail to parse are removed and reported as absent.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use pkce_auth_domain::{AuthCache, AuthError, AuthSettings, CacheStrategy, PendingAuthRequest, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::traits::KeyValueStorage;

/// In-memory key/value store
///
/// Lives as long as the process; used as the session-scoped backend.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.read().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.items.write().remove(key);
        Ok(())
    }
}

/// Typed access to the auth records of one session
#[derive(Clone)]
pub struct AuthStorage {
    persistent: Arc<dyn KeyValueStorage>,
    session: Arc<dyn KeyValueStorage>,
    strategy: CacheStrategy,
    cache_key: String,
    request_key: String,
}

impl std::fmt::Debug for AuthStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthStorage")
            .field("strategy", &self.strategy)
            .field("cache_key", &self.cache_key)
            .field("request_key", &self.request_key)
            .finish_non_exhaustive()
    }
}

impl AuthStorage {
    /// Create a storage adapter over explicit backends.
    ///
    /// # Arguments
    /// * `settings` - Supplies the record keys and the cache strategy
    /// * `persistent` - Backend that survives restarts
    /// * `session` - Backend scoped to the current session
    #[must_use]
    pub fn new(
        settings: &AuthSettings,
        persistent: Arc<dyn KeyValueStorage>,
        session: Arc<dyn KeyValueStorage>,
    ) -> Self {
        Self {
            persistent,
            session,
            strategy: settings.cache_strategy,
            cache_key: settings.auth_cache_key(),
            request_key: settings.auth_request_key(),
        }
    }

    /// Storage adapter whose backends are both in-memory.
    #[must_use]
    pub fn in_memory(settings: &AuthSettings) -> Self {
        Self::new(settings, Arc::new(MemoryStorage::new()), Arc::new(MemoryStorage::new()))
    }

    fn cache_store(&self) -> &dyn KeyValueStorage {
        match self.strategy {
            CacheStrategy::Persistent => self.persistent.as_ref(),
            CacheStrategy::SessionScoped => self.session.as_ref(),
        }
    }

    /// Load the persisted `AuthCache`.
    ///
    /// A corrupt record is removed and reported as `None`.
    ///
    /// # Errors
    /// Returns `AuthError::Storage` if the backend fails
    pub fn get_auth_cache(&self) -> Result<Option<AuthCache>> {
        read_json(self.cache_store(), &self.cache_key)
    }

    /// Persist `cache`, replacing the previous record.
    ///
    /// # Errors
    /// Returns `AuthError::Storage` if serialization or the backend fails
    pub fn set_auth_cache(&self, cache: &AuthCache) -> Result<()> {
        write_json(self.cache_store(), &self.cache_key, cache)
    }

    /// # Errors
    /// Returns `AuthError::Storage` if the backend fails
    pub fn clear_auth_cache(&self) -> Result<()> {
        self.cache_store().remove_item(&self.cache_key)
    }

    /// Persist the pending request in the session store.
    ///
    /// # Errors
    /// Returns `AuthError::Storage` if serialization or the backend fails
    pub fn set_auth_request(&self, request: &PendingAuthRequest) -> Result<()> {
        write_json(self.session.as_ref(), &self.request_key, request)
    }

    /// Read and remove the pending request.
    ///
    /// The record is gone after this call whatever the outcome of the
    /// callback, so a state token can never be matched twice.
    ///
    /// # Errors
    /// Returns `AuthError::Storage` if the backend fails
    pub fn take_auth_request(&self) -> Result<Option<PendingAuthRequest>> {
        let request = read_json(self.session.as_ref(), &self.request_key)?;
        if request.is_some() {
            self.session.remove_item(&self.request_key)?;
        }
        Ok(request)
    }
}

fn read_json<T: DeserializeOwned>(store: &dyn KeyValueStorage, key: &str) -> Result<Option<T>> {
    let Some(raw) = store.get_item(key)? else {
        return Ok(None);
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            warn!(key, error = %e, "Discarding corrupt auth record");
            store.remove_item(key)?;
            Ok(None)
        }
    }
}

fn write_json<T: Serialize>(store: &dyn KeyValueStorage, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value)
        .map_err(|e| AuthError::Storage(format!("failed to serialize {key}: {e}")))?;
    store.set_item(key, &raw)?;
    debug!(key, "Stored auth record");
    Ok(())
}
