//! Mock implementations of the auth ports
//!
//! Provides mock objects for testing purposes.

// Allow missing error/panic docs for test mocks - they are designed to be simple
// and errors are clearly indicated by their return types
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use pkce_auth_domain::{AuthError, Result, TokenSet};
use url::Url;

use crate::auth::{KeyValueStorage, Navigator, TokenExchange};

type CallLog = Arc<Mutex<Vec<(String, String)>>>;
type Response = Arc<Mutex<Option<Result<TokenSet>>>>;

/// Mock token endpoint that records every grant without network calls
///
/// Unconfigured grants fail with a 500 `AuthError::Exchange`.
///
/// # Examples
///
/// ```
/// # tokio_test::block_on(async {
/// use pkce_auth_common::auth::TokenExchange;
/// use pkce_auth_common::testing::{token_set, MockTokenExchange};
///
/// let client = MockTokenExchange::new();
/// client.set_code_response(Ok(token_set("a", "openid", 100)));
///
/// let tokens = client.exchange_code("code", "verifier").await.unwrap();
/// assert_eq!(tokens.scope, "openid");
/// assert_eq!(client.code_calls(), vec![("code".to_string(), "verifier".to_string())]);
/// # });
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockTokenExchange {
    code_response: Response,
    refresh_response: Response,
    code_calls: CallLog,
    refresh_calls: CallLog,
    delay: Arc<Mutex<Option<Duration>>>,
}

impl MockTokenExchange {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the result of every `exchange_code` call.
    pub fn set_code_response(&self, response: Result<TokenSet>) {
        *self.code_response.lock() = Some(response);
    }

    /// Configure the result of every `exchange_refresh_token` call.
    pub fn set_refresh_response(&self, response: Result<TokenSet>) {
        *self.refresh_response.lock() = Some(response);
    }

    /// Make every grant wait `delay` before answering.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    /// `(code, code_verifier)` of each code grant, in order.
    pub fn code_calls(&self) -> Vec<(String, String)> {
        self.code_calls.lock().clone()
    }

    /// `(refresh_token, scope)` of each refresh grant, in order.
    pub fn refresh_calls(&self) -> Vec<(String, String)> {
        self.refresh_calls.lock().clone()
    }

    pub fn code_call_count(&self) -> usize {
        self.code_calls.lock().len()
    }

    pub fn refresh_call_count(&self) -> usize {
        self.refresh_calls.lock().len()
    }

    /// Reset internal state.
    pub fn reset(&self) {
        *self.code_response.lock() = None;
        *self.refresh_response.lock() = None;
        *self.delay.lock() = None;
        self.code_calls.lock().clear();
        self.refresh_calls.lock().clear();
    }

    async fn respond(&self, response: &Response) -> Result<TokenSet> {
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let configured = response.lock().clone();
        configured.unwrap_or_else(|| {
            Err(AuthError::exchange(Some(500), "no mock response configured"))
        })
    }
}

#[async_trait]
impl TokenExchange for MockTokenExchange {
    async fn exchange_code(&self, code: &str, code_verifier: &str) -> Result<TokenSet> {
        self.code_calls.lock().push((code.to_string(), code_verifier.to_string()));
        self.respond(&self.code_response).await
    }

    async fn exchange_refresh_token(&self, refresh_token: &str, scope: &str) -> Result<TokenSet> {
        if refresh_token.is_empty() {
            return Err(AuthError::NoRefreshToken);
        }
        self.refresh_calls.lock().push((refresh_token.to_string(), scope.to_string()));
        self.respond(&self.refresh_response).await
    }
}

/// One navigation performed through [`RecordingNavigator`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationEvent {
    Navigate(Url),
    Replace(Url),
}

/// Navigator that records navigations instead of performing them
#[derive(Debug, Clone)]
pub struct RecordingNavigator {
    location: Arc<Mutex<Url>>,
    events: Arc<Mutex<Vec<NavigationEvent>>>,
}

impl RecordingNavigator {
    /// Create a navigator currently at `location`.
    pub fn new(location: &str) -> Self {
        let location = Url::parse(location).expect("navigator location must be a valid URL");
        Self { location: Arc::new(Mutex::new(location)), events: Arc::new(Mutex::new(Vec::new())) }
    }

    pub fn set_location(&self, location: &str) {
        *self.location.lock() = Url::parse(location).expect("navigator location must be a valid URL");
    }

    pub fn events(&self) -> Vec<NavigationEvent> {
        self.events.lock().clone()
    }

    /// URLs passed to `navigate`, in order.
    pub fn navigations(&self) -> Vec<Url> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                NavigationEvent::Navigate(url) => Some(url.clone()),
                NavigationEvent::Replace(_) => None,
            })
            .collect()
    }

    /// URLs passed to `replace`, in order.
    pub fn replacements(&self) -> Vec<Url> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                NavigationEvent::Replace(url) => Some(url.clone()),
                NavigationEvent::Navigate(_) => None,
            })
            .collect()
    }
}

impl Navigator for RecordingNavigator {
    fn current_location(&self) -> Url {
        self.location.lock().clone()
    }

    fn navigate(&self, url: &Url) {
        self.events.lock().push(NavigationEvent::Navigate(url.clone()));
        *self.location.lock() = url.clone();
    }

    fn replace(&self, url: &Url) {
        self.events.lock().push(NavigationEvent::Replace(url.clone()));
        *self.location.lock() = url.clone();
    }
}

/// Storage backend whose every operation fails
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingStorage;

impl KeyValueStorage for FailingStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Err(AuthError::Storage(format!("cannot read {key}")))
    }

    fn set_item(&self, key: &str, _value: &str) -> Result<()> {
        Err(AuthError::Storage(format!("cannot write {key}")))
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        Err(AuthError::Storage(format!("cannot remove {key}")))
    }
}
