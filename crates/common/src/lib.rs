//! Authorization Code + PKCE client logic shared across pkce-auth crates.
//!
//! # Safety and Quality
//!
//! This crate forbids unsafe code and keeps every fallible operation behind
//! `pkce_auth_domain::Result`.
//!
//! # Features
//!
//! - `test-utils`: mocks, fixtures and a controllable clock for tests of
//!   downstream crates

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod auth;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use auth::{AuthService, AuthStorage, OAuthClient};
