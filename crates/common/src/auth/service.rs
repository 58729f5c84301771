//! High-level authorization service
//!
//! Combines the token endpoint client, the token cache, the callback
//! validator and the navigation port into the surface an embedding
//! application talks to.
//!
//! Access tokens are served from the cache while more than
//! [`REFRESH_THRESHOLD_SECONDS`] of lifetime remain, refreshed silently
//! otherwise, and a full login redirect is started when there is no session
//! or the refresh fails. Concurrent refreshes of the same scope share one
//! token endpoint request.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use pkce_auth_domain::constants::REFRESH_THRESHOLD_SECONDS;
use pkce_auth_domain::{AuthError, AuthSettings, CallbackError, PendingAuthRequest, Result, UserProfile};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::authorize::{build_authorization_request, end_session_url};
use super::cache::TokenCache;
use super::callback::{CallbackOutcome, CallbackParams, CallbackState, CallbackValidator};
use super::storage::AuthStorage;
use super::traits::{Clock, Navigator, SystemClock, TokenExchange};

type RefreshFuture = Shared<BoxFuture<'static, Result<String>>>;

/// Authorization service for one client session
///
/// High-level service that orchestrates:
/// - Authorization Code + PKCE login redirects
/// - Callback validation and code exchange
/// - Per-scope access token caching with silent refresh
/// - Logout through the provider's end-session endpoint
pub struct AuthService<C, N>
where
    C: TokenExchange + 'static,
    N: Navigator + 'static,
{
    settings: Arc<AuthSettings>,
    client: Arc<C>,
    navigator: Arc<N>,
    storage: AuthStorage,
    cache: Arc<TokenCache>,
    clock: Arc<dyn Clock>,
    callback: CallbackValidator,
    in_flight: Mutex<HashMap<String, RefreshFuture>>,
    callback_errors: watch::Sender<Option<CallbackError>>,
}

impl<C, N> AuthService<C, N>
where
    C: TokenExchange + 'static,
    N: Navigator + 'static,
{
    /// Create a new authorization service
    ///
    /// # Arguments
    /// * `settings` - Endpoints, client id, scope and cache options
    /// * `storage` - Storage adapter built for the same `settings`
    /// * `client` - Token endpoint client
    /// * `navigator` - Navigation capability of the embedding application
    ///
    /// # Errors
    /// Returns `AuthError::Configuration` if `settings` fail validation
    pub fn new(
        settings: Arc<AuthSettings>,
        storage: AuthStorage,
        client: Arc<C>,
        navigator: Arc<N>,
    ) -> Result<Self> {
        settings.validate()?;

        let cache = Arc::new(TokenCache::new(storage.clone(), settings.client_id.clone()));
        let (callback_errors, _) = watch::channel(None);

        Ok(Self {
            settings,
            client,
            navigator,
            storage,
            cache,
            clock: Arc::new(SystemClock),
            callback: CallbackValidator::new(),
            in_flight: Mutex::new(HashMap::new()),
            callback_errors,
        })
    }

    /// Replace the clock used for expiry decisions.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn settings(&self) -> &AuthSettings {
        &self.settings
    }

    /// Load the persisted session.
    ///
    /// Should be called on app startup. Returns `true` if a session exists.
    pub fn initialize(&self) -> bool {
        let authenticated = self.cache.read().is_some();
        info!(authenticated, "Authorization service initialized");
        authenticated
    }

    /// `true` until the persisted session has been loaded.
    pub fn is_loading(&self) -> bool {
        !self.cache.is_loaded()
    }

    pub fn is_authenticated(&self) -> bool {
        self.cache.read().is_some()
    }

    /// Profile of the signed-in user.
    pub fn user(&self) -> Option<UserProfile> {
        self.cache.read().map(|cache| cache.user)
    }

    /// Get an access token for `scope` (the configured scope if `None`)
    ///
    /// # Errors
    /// - `AuthError::LoginRequired` when there is no session or the refresh
    ///   failed; a login redirect has been started
    /// - `AuthError::Configuration` / `AuthError::Storage` if the login
    ///   redirect itself could not be prepared
    pub async fn get_access_token(&self, scope: Option<&str>) -> Result<String> {
        let scope = scope.unwrap_or(&self.settings.scope);

        let Some(cache) = self.cache.read() else {
            info!(scope, "No session; starting login");
            self.redirect_to_login()?;
            return Err(AuthError::LoginRequired);
        };

        let now = self.clock.now_unix();
        if let Some(token) = cache.fresh_token(scope, now, REFRESH_THRESHOLD_SECONDS) {
            debug!(scope, "Serving cached access token");
            return Ok(token.to_string());
        }

        match self.refresh(scope, cache.refresh_token).await {
            Ok(token) => Ok(token),
            Err(e) => {
                warn!(scope, error = %e, "Silent refresh failed; starting login");
                self.redirect_to_login()?;
                Err(AuthError::LoginRequired)
            }
        }
    }

    // Joins the in-flight refresh for `scope` or starts one.
    async fn refresh(&self, scope: &str, refresh_token: String) -> Result<String> {
        let refresh = {
            let mut in_flight = self.in_flight.lock();
            if let Some(existing) = in_flight.get(scope) {
                debug!(scope, "Joining in-flight refresh");
                existing.clone()
            } else {
                let client = Arc::clone(&self.client);
                let cache = Arc::clone(&self.cache);
                let owned_scope = scope.to_string();

                let future = async move {
                    let tokens = client.exchange_refresh_token(&refresh_token, &owned_scope).await?;
                    cache.write(&tokens)?;
                    info!(scope = %owned_scope, "Access token refreshed");
                    Ok(tokens.access_token)
                }
                .boxed()
                .shared();

                in_flight.insert(scope.to_string(), future.clone());
                future
            }
        };

        let result = refresh.clone().await;

        let mut in_flight = self.in_flight.lock();
        if in_flight.get(scope).is_some_and(|current| current.ptr_eq(&refresh)) {
            in_flight.remove(scope);
        }

        result
    }

    /// Start a login redirect
    ///
    /// Persists a fresh pending request (state, verifier, current location)
    /// and navigates to the authorization endpoint.
    ///
    /// # Errors
    /// Returns `AuthError::Configuration` if random generation fails or
    /// `AuthError::Storage` if the pending request cannot be stored
    pub fn redirect_to_login(&self) -> Result<()> {
        let request = build_authorization_request(&self.settings)?;
        let pending = PendingAuthRequest {
            state: request.state,
            code_verifier: request.code_verifier,
            login_success_redirect_uri: self.navigator.current_location(),
        };
        self.storage.set_auth_request(&pending)?;

        info!(
            authorization_endpoint = %self.settings.endpoints.authorization_endpoint,
            "Redirecting to authorization endpoint"
        );
        self.navigator.navigate(&request.authorization_url);
        Ok(())
    }

    /// Clear the session, then navigate to the provider's end-session URL.
    ///
    /// # Errors
    /// Returns `AuthError::Storage` if the session cannot be cleared; no
    /// navigation happens in that case
    pub fn redirect_to_logout(&self) -> Result<()> {
        self.cache.clear()?;

        let url = end_session_url(&self.settings);
        info!(end_session_endpoint = %self.settings.endpoints.end_session_endpoint, "Logging out");
        self.navigator.navigate(&url);
        Ok(())
    }

    /// Drop the session without navigating.
    ///
    /// # Errors
    /// Returns `AuthError::Storage` if the persisted record cannot be removed
    pub fn clear_cache(&self) -> Result<()> {
        self.cache.clear()
    }

    /// Complete (or reject) a callback redirect
    ///
    /// On success the tokens are cached and the navigator is sent back to the
    /// location the login started from. Failures are published to
    /// [`subscribe_callback_errors`](Self::subscribe_callback_errors).
    pub async fn handle_callback(&self, params: &CallbackParams) -> CallbackOutcome {
        let outcome = self.callback.handle(params, &self.storage, self.client.as_ref()).await;

        match &outcome {
            CallbackOutcome::Completed { tokens, redirect_to } => {
                if let Err(e) = self.cache.write(tokens) {
                    warn!(error = %e, "Exchanged tokens could not be cached");
                    let failed = self.callback.fail(&e);
                    if let CallbackOutcome::Failed(error) = &failed {
                        self.callback_errors.send_replace(Some(error.clone()));
                    }
                    return failed;
                }
                info!(redirect_to = %redirect_to, "Login completed");
                self.navigator.replace(redirect_to);
            }
            CallbackOutcome::Failed(error) => {
                self.callback_errors.send_replace(Some(error.clone()));
            }
            CallbackOutcome::Idle | CallbackOutcome::Duplicate => {}
        }

        outcome
    }

    pub fn callback_state(&self) -> CallbackState {
        self.callback.state()
    }

    /// Most recent callback error.
    pub fn callback_error(&self) -> Option<CallbackError> {
        self.callback_errors.borrow().clone()
    }

    /// Observe callback errors as they are reported.
    pub fn subscribe_callback_errors(&self) -> watch::Receiver<Option<CallbackError>> {
        self.callback_errors.subscribe()
    }
}
