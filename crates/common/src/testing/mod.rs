//! Testing utilities and helpers
//!
//! This module provides:
//! - **[`fixtures`]**: unsigned JWTs, token sets and provider settings
//! - **[`mocks`]**: mock token endpoint, recording navigator, failing storage
//! - **[`time`]**: controllable wall clock
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use pkce_auth_common::auth::{AuthService, AuthStorage};
//! use pkce_auth_common::testing::{shared_settings, MockClock, MockTokenExchange, RecordingNavigator};
//!
//! let settings = shared_settings("https://idp.test");
//! let storage = AuthStorage::in_memory(&settings);
//! let service = AuthService::new(
//!     settings,
//!     storage,
//!     Arc::new(MockTokenExchange::new()),
//!     Arc::new(RecordingNavigator::new("https://app.test/")),
//! )
//! .unwrap()
//! .with_clock(Arc::new(MockClock::at(1_700_000_000)));
//! assert!(!service.is_authenticated());
//! ```

pub mod fixtures;
pub mod mocks;
pub mod time;

pub use fixtures::{
    access_token_jwt, id_token_jwt, shared_settings, test_settings, token_set, unsigned_jwt,
    TEST_CLIENT_ID, TEST_SCOPE,
};
pub use mocks::{FailingStorage, MockTokenExchange, NavigationEvent, RecordingNavigator};
pub use time::MockClock;
