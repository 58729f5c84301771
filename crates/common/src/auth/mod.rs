//! OAuth 2.0 Authorization Code + PKCE client core
//!
//! This module implements the client side of the OIDC Authorization Code
//! flow for public clients (no client secret), with PKCE (RFC 7636).
//!
//! # Features
//!
//! - **PKCE Flow**: S256 code challenges from 128-character verifiers
//! - **Callback Validation**: state binding, single-use pending requests,
//!   deduplicated provider errors
//! - **Token Cache**: per-scope access tokens persisted through an injected
//!   key/value store
//! - **Silent Refresh**: tokens are renewed when less than 60 seconds
//!   remain, with one in-flight refresh per scope
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   AuthService   │  High-level orchestrator
//! └────────┬────────┘
//!          │
//!          ├──► TokenExchange      (OAuthClient: token endpoint grants)
//!          ├──► TokenCache         (per-scope tokens + user profile)
//!          │         │
//!          │         └──► AuthStorage ──► KeyValueStorage backends
//!          │
//!          ├──► CallbackValidator  (redirect handling state machine)
//!          ├──► Navigator          (embedding application)
//!          │
//!          └──► authorize / pkce   (URL + challenge generation)
//! ```
//!
//! # Usage Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use pkce_auth_common::auth::{AuthService, AuthStorage, CallbackParams, Navigator, OAuthClient};
//! use pkce_auth_domain::{AuthEndpoints, AuthSettings};
//! use url::Url;
//!
//! struct Browser;
//!
//! impl Navigator for Browser {
//!     fn current_location(&self) -> Url {
//!         Url::parse("http://localhost:3000/").unwrap()
//!     }
//!     fn navigate(&self, url: &Url) {
//!         println!("open {url}");
//!     }
//!     fn replace(&self, url: &Url) {
//!         println!("replace {url}");
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = Arc::new(AuthSettings::new(
//!         AuthEndpoints {
//!             authorization_endpoint: Url::parse("https://idp.example.com/authorize")?,
//!             token_endpoint: Url::parse("https://idp.example.com/token")?,
//!             end_session_endpoint: Url::parse("https://idp.example.com/logout")?,
//!         },
//!         "client_id",
//!         Url::parse("http://localhost:3000/callback")?,
//!         Url::parse("http://localhost:3000/")?,
//!         "openid profile offline_access",
//!     ));
//!
//!     let storage = AuthStorage::in_memory(&settings);
//!     let client = Arc::new(OAuthClient::new(settings.clone()));
//!     let service = AuthService::new(settings, storage, client, Arc::new(Browser))?;
//!
//!     // Starts a login redirect when there is no session yet
//!     if let Ok(token) = service.get_access_token(None).await {
//!         println!("Bearer {token}");
//!     }
//!
//!     // Later, when the browser comes back to the redirect URI
//!     let callback = Url::parse("http://localhost:3000/callback?code=abc&state=xyz")?;
//!     service.handle_callback(&CallbackParams::from_url(&callback)).await;
//!
//!     Ok(())
//! }
//! ```

pub mod authorize;
pub mod cache;
pub mod callback;
pub mod client;
pub mod jwt;
pub mod pkce;
pub mod service;
pub mod storage;
pub mod traits;

pub use authorize::{build_authorization_request, end_session_url};
pub use cache::TokenCache;
pub use callback::{CallbackOutcome, CallbackParams, CallbackState, CallbackValidator};
pub use client::OAuthClient;
pub use pkce::PkceChallenge;
pub use service::AuthService;
pub use storage::{AuthStorage, MemoryStorage};
pub use traits::{Clock, KeyValueStorage, Navigator, SystemClock, TokenExchange};
