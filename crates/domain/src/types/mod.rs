//! Domain types and models
//!
//! - [`tokens`]: token endpoint results and the durable per-scope cache
//! - [`user`]: user profile derived from ID-token claims
//! - [`request`]: authorization request, pending request and callback errors

pub mod request;
pub mod tokens;
pub mod user;

pub use request::{AuthorizationRequest, CallbackError, PendingAuthRequest};
pub use tokens::{AccessTokenEntry, AuthCache, TokenSet};
pub use user::UserProfile;
