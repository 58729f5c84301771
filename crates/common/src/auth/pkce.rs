//! PKCE (Proof Key for Code Exchange) implementation for OAuth 2.0
//!
//! Implements RFC 7636 for secure OAuth authorization without client secrets.
//! Also provides the random identifiers (state, verifier) used by the flow.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use pkce_auth_domain::constants::{CODE_CHALLENGE_METHOD, CODE_VERIFIER_LENGTH, STATE_LENGTH};
use pkce_auth_domain::{AuthError, Result};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// URL-safe alphabet; 64 symbols so `byte & 63` maps without bias.
const URL_SAFE_ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Generate a cryptographically secure random string of `length` characters
///
/// Characters are drawn from `A-Z a-z 0-9 - _`, so the output is valid both
/// as a PKCE verifier (RFC 7636 unreserved set) and inside a URL.
///
/// # Errors
/// Returns `AuthError::Configuration` if the operating system CSPRNG is
/// unavailable. This is fatal and must not be ignored.
pub fn random_token(length: usize) -> Result<String> {
    let mut bytes = vec![0u8; length];
    OsRng.try_fill_bytes(&mut bytes).map_err(|e| {
        AuthError::Configuration(format!("secure random number generator unavailable: {e}"))
    })?;

    Ok(bytes.iter().map(|b| char::from(URL_SAFE_ALPHABET[usize::from(b & 63)])).collect())
}

/// Generate a 128-character code verifier (upper RFC 7636 bound).
///
/// # Errors
/// Returns error if random number generation fails
pub fn generate_code_verifier() -> Result<String> {
    random_token(CODE_VERIFIER_LENGTH)
}

/// Generate a random state token for CSRF protection (21 characters).
///
/// # Errors
/// Returns error if random number generation fails
pub fn generate_state() -> Result<String> {
    random_token(STATE_LENGTH)
}

/// SHA-256 digest of the UTF-8 bytes of `input`.
#[must_use]
pub fn sha256(input: &str) -> [u8; 32] {
    Sha256::digest(input.as_bytes()).into()
}

/// Base64url encoding without padding (`+` → `-`, `/` → `_`, `=` stripped).
#[must_use]
pub fn base64_url_encode(bytes: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Code challenge for a verifier: `BASE64URL(SHA256(ASCII(code_verifier)))`.
#[must_use]
pub fn generate_code_challenge(verifier: &str) -> String {
    base64_url_encode(sha256(verifier))
}

/// Validate that the state token matches
///
/// Compares in constant time with respect to the content of equal-length
/// inputs.
#[must_use]
pub fn validate_state(expected: &str, actual: &str) -> bool {
    expected.as_bytes().ct_eq(actual.as_bytes()).into()
}

/// PKCE challenge triple for one authorization request
///
/// Contains the code verifier (sent during token exchange), the code
/// challenge (sent during authorization request) and the CSRF state.
#[derive(Debug, Clone)]
pub struct PkceChallenge {
    /// Random string kept secret until token exchange
    pub code_verifier: String,

    /// SHA256 hash of code_verifier (base64url encoded)
    pub code_challenge: String,

    /// Random CSRF protection token
    pub state: String,
}

impl PkceChallenge {
    /// Generate a new PKCE challenge with cryptographically secure random
    /// values
    ///
    /// # Examples
    /// ```
    /// use pkce_auth_common::auth::pkce::PkceChallenge;
    ///
    /// let challenge = PkceChallenge::generate().expect("Failed to generate PKCE challenge");
    /// assert_eq!(challenge.code_verifier.len(), 128);
    /// assert_eq!(challenge.state.len(), 21);
    /// ```
    ///
    /// # Errors
    /// Returns error if cryptographic random number generation fails
    pub fn generate() -> Result<Self> {
        let state = generate_state()?;
        let code_verifier = generate_code_verifier()?;
        let code_challenge = generate_code_challenge(&code_verifier);

        Ok(Self { code_verifier, code_challenge, state })
    }

    /// Get the challenge method (always "S256" for SHA256)
    #[must_use]
    pub const fn challenge_method(&self) -> &'static str {
        CODE_CHALLENGE_METHOD
    }
}
