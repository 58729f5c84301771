//! Redirect callback validation
//!
//! Decides what to do with the query parameters the provider redirects back
//! with:
//!
//! 1. provider `error` with `error_description` → report it (once per
//!    distinct error)
//! 2. missing `code` or `state` → not a callback yet, do nothing
//! 3. no pending request → nothing to complete, do nothing
//! 4. `state` mismatch → report "Invalid State"
//! 5. otherwise exchange the code with the stored verifier
//!
//! The pending request is consumed when read, so each state token is matched
//! at most once.

use parking_lot::Mutex;
use pkce_auth_domain::{AuthError, CallbackError, TokenSet};
use tracing::{debug, info, warn};
use url::Url;

use super::pkce::validate_state;
use super::storage::AuthStorage;
use super::traits::TokenExchange;

/// Query parameters of a callback redirect
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl CallbackParams {
    /// Parse a raw query string, with or without the leading `?`.
    ///
    /// Empty values count as absent.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let mut params = Self::default();
        let query = query.strip_prefix('?').unwrap_or(query);

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            if value.is_empty() {
                continue;
            }
            let slot = match &*key {
                "code" => &mut params.code,
                "state" => &mut params.state,
                "error" => &mut params.error,
                "error_description" => &mut params.error_description,
                _ => continue,
            };
            *slot = Some(value.into_owned());
        }

        params
    }

    #[must_use]
    pub fn from_url(url: &Url) -> Self {
        Self::from_query(url.query().unwrap_or_default())
    }

    /// Provider error carried by the redirect, if any.
    ///
    /// Only a redirect with both `error` and `error_description` counts; an
    /// `error` on its own falls through to the code/state checks.
    #[must_use]
    pub fn provider_error(&self) -> Option<AuthError> {
        match (&self.error, &self.error_description) {
            (Some(error), Some(description)) => {
                Some(AuthError::Provider { error: error.clone(), description: description.clone() })
            }
            _ => None,
        }
    }
}

/// Where the callback state machine stands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CallbackState {
    #[default]
    Idle,
    ErrorReceived,
    AwaitingExchange,
    Completed,
}

/// Result of handling one callback delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// Not a callback, or nothing pending: no side effects
    Idle,
    /// Same provider error as last time: no side effects
    Duplicate,
    /// Report this error to the user
    Failed(CallbackError),
    /// Code exchanged; cache `tokens` and continue to `redirect_to`
    Completed { tokens: TokenSet, redirect_to: Url },
}

#[derive(Debug, Default)]
struct Inner {
    state: CallbackState,
    last_error: Option<CallbackError>,
}

/// Stateful callback handler for one session
#[derive(Debug, Default)]
pub struct CallbackValidator {
    inner: Mutex<Inner>,
}

impl CallbackValidator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> CallbackState {
        self.inner.lock().state
    }

    /// Last error reported by [`handle`](Self::handle).
    #[must_use]
    pub fn last_error(&self) -> Option<CallbackError> {
        self.inner.lock().last_error.clone()
    }

    /// Handle one callback delivery
    ///
    /// # Arguments
    /// * `params` - Query parameters of the redirect
    /// * `storage` - Holds the pending request (consumed here)
    /// * `client` - Token endpoint used for the code exchange
    pub async fn handle<C>(
        &self,
        params: &CallbackParams,
        storage: &AuthStorage,
        client: &C,
    ) -> CallbackOutcome
    where
        C: TokenExchange + ?Sized,
    {
        if let Some(err) = params.provider_error() {
            let error = CallbackError::from(&err);
            let mut inner = self.inner.lock();
            if inner.last_error.as_ref() == Some(&error) {
                debug!(error = %error.error, "Ignoring repeated provider error");
                return CallbackOutcome::Duplicate;
            }
            warn!(error = %error.error, description = %error.error_description, "Provider returned an error");
            inner.state = CallbackState::ErrorReceived;
            inner.last_error = Some(error.clone());
            return CallbackOutcome::Failed(error);
        }

        let (Some(code), Some(state)) = (params.code.as_deref(), params.state.as_deref()) else {
            return CallbackOutcome::Idle;
        };

        let pending = match storage.take_auth_request() {
            Ok(Some(pending)) => pending,
            Ok(None) => {
                debug!("Callback received with no pending authorization request");
                return CallbackOutcome::Idle;
            }
            Err(e) => {
                warn!(error = %e, "Failed to read pending authorization request");
                return CallbackOutcome::Idle;
            }
        };

        if !validate_state(&pending.state, state) {
            warn!("Callback state does not match the pending authorization request");
            return self.fail(&AuthError::StateMismatch);
        }

        self.inner.lock().state = CallbackState::AwaitingExchange;

        match client.exchange_code(code, &pending.code_verifier).await {
            Ok(tokens) => {
                info!(scope = %tokens.scope, "Authorization code exchanged");
                self.inner.lock().state = CallbackState::Completed;
                CallbackOutcome::Completed { tokens, redirect_to: pending.login_success_redirect_uri }
            }
            Err(e) => {
                warn!(error = %e, "Authorization code exchange failed");
                self.fail(&e)
            }
        }
    }

    pub(crate) fn fail(&self, err: &AuthError) -> CallbackOutcome {
        let error = CallbackError::from(err);
        let mut inner = self.inner.lock();
        inner.state = CallbackState::ErrorReceived;
        inner.last_error = Some(error.clone());
        CallbackOutcome::Failed(error)
    }
}
