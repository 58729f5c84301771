//! Controllable wall clock for expiry tests
//!
//! # Examples
//!
//! ```
//! use pkce_auth_common::auth::Clock;
//! use pkce_auth_common::testing::MockClock;
//!
//! let clock = MockClock::at(1_700_000_000);
//! clock.advance(59);
//! assert_eq!(clock.now_unix(), 1_700_000_059);
//! ```

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use crate::auth::Clock;

/// Mock clock for deterministic testing
///
/// Time only moves when the test moves it. Clones share the same time.
#[derive(Debug, Clone)]
pub struct MockClock {
    now: Arc<AtomicI64>,
}

impl MockClock {
    /// Create a mock clock starting at the current real time.
    pub fn new() -> Self {
        Self::at(chrono::Utc::now().timestamp())
    }

    /// Create a mock clock starting at `unix_seconds`.
    pub fn at(unix_seconds: i64) -> Self {
        Self { now: Arc::new(AtomicI64::new(unix_seconds)) }
    }

    pub fn set(&self, unix_seconds: i64) {
        self.now.store(unix_seconds, Ordering::SeqCst);
    }

    /// Move time forward by `seconds` (negative moves it back).
    pub fn advance(&self, seconds: i64) {
        self.now.fetch_add(seconds, Ordering::SeqCst);
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now_unix(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}
