//! Token cache
//!
//! In-memory view of the persisted `AuthCache`, loaded lazily from
//! [`AuthStorage`] once and then served from memory until invalidated.
//! Writes decode the tokens, merge the new access token into the per-scope
//! map and persist the result before updating memory.

use parking_lot::Mutex;
use pkce_auth_domain::{AccessTokenEntry, AuthCache, AuthError, Result, TokenSet, UserProfile};
use tracing::{debug, error, info, warn};

use super::jwt;
use super::storage::AuthStorage;

#[derive(Debug, Default)]
struct Slot {
    loaded: bool,
    value: Option<AuthCache>,
}

/// Lazily loaded, write-through token cache
#[derive(Debug)]
pub struct TokenCache {
    storage: AuthStorage,
    client_id: String,
    slot: Mutex<Slot>,
}

impl TokenCache {
    /// Create a cache over `storage` for tokens issued to `client_id`.
    #[must_use]
    pub fn new(storage: AuthStorage, client_id: impl Into<String>) -> Self {
        Self { storage, client_id: client_id.into(), slot: Mutex::new(Slot::default()) }
    }

    /// Current cache contents, loading from storage on first use.
    ///
    /// A storage failure is logged and treated as "no session".
    pub fn read(&self) -> Option<AuthCache> {
        let mut slot = self.slot.lock();
        self.ensure_loaded(&mut slot);
        slot.value.clone()
    }

    /// `true` once the persisted record has been loaded (or written).
    pub fn is_loaded(&self) -> bool {
        self.slot.lock().loaded
    }

    /// Drop the in-memory copy so the next `read` reloads from storage.
    pub fn invalidate(&self) {
        *self.slot.lock() = Slot::default();
    }

    /// Merge `tokens` into the cache and persist the result.
    ///
    /// Entries for other scopes are preserved. An empty `refresh_token` or
    /// `id_token` keeps the value already cached (and, for the ID token, the
    /// derived user).
    ///
    /// # Errors
    /// - `AuthError::Decoding` if either token cannot be decoded, or the
    ///   access token was issued to another client. The cache is unchanged.
    /// - `AuthError::Storage` if persisting fails. Memory is unchanged.
    pub fn write(&self, tokens: &TokenSet) -> Result<AuthCache> {
        let access = jwt::decode_access_token(&tokens.access_token).map_err(|e| {
            error!(scope = %tokens.scope, error = %e, "Failed to decode access token");
            e
        })?;

        if let Some(issued_to) = access.issued_to() {
            if issued_to != self.client_id {
                error!(
                    scope = %tokens.scope,
                    issued_to,
                    expected = %self.client_id,
                    "Access token was issued to a different client"
                );
                return Err(AuthError::Decoding(format!(
                    "access token issued to '{issued_to}', expected '{}'",
                    self.client_id
                )));
            }
        }

        let mut slot = self.slot.lock();
        self.ensure_loaded(&mut slot);
        let previous = slot.value.as_ref();

        let (id_token, user) = if tokens.id_token.is_empty() {
            match previous {
                Some(cache) => (cache.id_token.clone(), cache.user.clone()),
                None => {
                    error!(scope = %tokens.scope, "Token response carried no ID token");
                    return Err(AuthError::Decoding("no ID token available".to_string()));
                }
            }
        } else {
            let claims = jwt::decode_id_token(&tokens.id_token).map_err(|e| {
                error!(scope = %tokens.scope, error = %e, "Failed to decode ID token");
                e
            })?;
            (tokens.id_token.clone(), UserProfile::from(claims))
        };

        let refresh_token = match (tokens.refresh_token.is_empty(), previous) {
            (true, Some(cache)) => cache.refresh_token.clone(),
            _ => tokens.refresh_token.clone(),
        };

        let mut access_tokens = previous.map(|cache| cache.access_tokens.clone()).unwrap_or_default();
        access_tokens.insert(
            tokens.scope.clone(),
            AccessTokenEntry { token: tokens.access_token.clone(), expire_time: access.exp },
        );

        let cache = AuthCache { access_tokens, id_token, refresh_token, user };
        self.storage.set_auth_cache(&cache)?;

        debug!(scope = %tokens.scope, expire_time = access.exp, "Cached access token");
        slot.value = Some(cache.clone());
        slot.loaded = true;

        Ok(cache)
    }

    /// Remove the session from memory and storage.
    ///
    /// # Errors
    /// Returns `AuthError::Storage` if the persisted record cannot be removed
    pub fn clear(&self) -> Result<()> {
        let mut slot = self.slot.lock();
        self.storage.clear_auth_cache()?;
        slot.value = None;
        slot.loaded = true;
        info!("Token cache cleared");
        Ok(())
    }

    fn ensure_loaded(&self, slot: &mut Slot) {
        if slot.loaded {
            return;
        }

        slot.value = match self.storage.get_auth_cache() {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Failed to load token cache; treating session as signed out");
                None
            }
        };
        slot.loaded = true;
        debug!(present = slot.value.is_some(), "Token cache loaded");
    }
}
