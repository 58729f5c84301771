//! # PKCE Auth Infrastructure
//!
//! Infrastructure implementations of the authorization core's ports.
//!
//! This crate contains:
//! - Configuration loading (environment, TOML, JSON)
//! - Tracing subscriber bootstrap
//! - File-backed persistent key/value storage
//! - Session wiring from a loaded [`Config`](pkce_auth_domain::Config)
//!
//! ## Architecture
//! - Implements traits defined in `pkce-auth-common`
//! - Contains all "impure" code (file system, process environment)

pub mod config;
pub mod observability;
pub mod session;
pub mod storage;

// Re-export commonly used items
pub use observability::init_tracing;
pub use session::build_service;
pub use storage::FileStorage;
