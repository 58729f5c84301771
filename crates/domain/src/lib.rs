//! # PKCE Auth Domain
//!
//! Data model shared by the authorization core and its infrastructure.
//!
//! This crate contains:
//! - Session settings (`AuthSettings`) and cache strategy selection
//! - Token, cache, pending-request and user profile types
//! - The `AuthError` taxonomy and `Result` alias
//! - Protocol constants (PKCE lengths, refresh threshold, storage keys)
//!
//! ## Architecture
//! - No dependencies on other workspace crates
//! - No I/O; pure data and validation

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
