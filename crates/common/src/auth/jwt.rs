//! JWT claim decoding
//!
//! Reads the payload segment of a compact JWT. Signatures and issuers are
//! not verified: claims are trusted as delivered by the token endpoint over
//! TLS.

use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use base64::Engine;
use pkce_auth_domain::{AuthError, Result, UserProfile};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

/// Claims read from an access token
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AccessTokenClaims {
    /// Expiry, unix seconds
    #[serde(deserialize_with = "deserialize_exp")]
    pub exp: i64,
    /// Authorized party (OIDC)
    #[serde(default)]
    pub azp: Option<String>,
    /// Client the token was issued to (RFC 9068)
    #[serde(default)]
    pub client_id: Option<String>,
}

impl AccessTokenClaims {
    /// The client this token claims to be issued to, if it says.
    #[must_use]
    pub fn issued_to(&self) -> Option<&str> {
        self.azp.as_deref().or(self.client_id.as_deref())
    }
}

/// Identity claims read from an ID token
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct IdTokenClaims {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub family_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_roles")]
    pub roles: Vec<String>,
}

impl From<IdTokenClaims> for UserProfile {
    fn from(claims: IdTokenClaims) -> Self {
        Self {
            email: claims.email.unwrap_or_default(),
            first_name: claims.given_name.unwrap_or_default(),
            last_name: claims.family_name.unwrap_or_default(),
            roles: claims.roles,
        }
    }
}

/// Decode the payload of `token` into `T`.
///
/// # Errors
/// Returns `AuthError::Decoding` if the token has no payload segment, the
/// segment is not base64, or the JSON does not match `T`.
pub fn decode_claims<T: DeserializeOwned>(token: &str) -> Result<T> {
    let payload = token
        .split('.')
        .nth(1)
        .filter(|segment| !segment.is_empty())
        .ok_or_else(|| AuthError::Decoding("token has no payload segment".to_string()))?;

    let bytes = decode_segment(payload)?;

    serde_json::from_slice(&bytes)
        .map_err(|e| AuthError::Decoding(format!("invalid claims JSON: {e}")))
}

/// Decode access-token claims.
///
/// # Errors
/// Returns `AuthError::Decoding` on malformed tokens or a missing `exp`.
pub fn decode_access_token(token: &str) -> Result<AccessTokenClaims> {
    decode_claims(token)
}

/// Decode ID-token claims.
///
/// # Errors
/// Returns `AuthError::Decoding` on malformed tokens.
pub fn decode_id_token(token: &str) -> Result<IdTokenClaims> {
    decode_claims(token)
}

// Providers disagree on padding and alphabet; accept both.
fn decode_segment(segment: &str) -> Result<Vec<u8>> {
    let trimmed = segment.trim_end_matches('=');
    URL_SAFE_NO_PAD
        .decode(trimmed)
        .or_else(|_| STANDARD_NO_PAD.decode(trimmed))
        .map_err(|e| AuthError::Decoding(format!("invalid base64 payload: {e}")))
}

fn deserialize_exp<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Exp {
        Int(i64),
        Float(f64),
        Text(String),
    }

    match Exp::deserialize(deserializer)? {
        Exp::Int(value) => Ok(value),
        #[allow(clippy::cast_possible_truncation)]
        Exp::Float(value) if value.is_finite() => Ok(value.trunc() as i64),
        Exp::Float(value) => Err(serde::de::Error::custom(format!("exp is not finite: {value}"))),
        Exp::Text(text) => text
            .trim()
            .parse::<i64>()
            .map_err(|e| serde::de::Error::custom(format!("exp is not numeric: {e}"))),
    }
}

fn deserialize_roles<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Roles {
        One(String),
        Many(Vec<String>),
        Missing(()),
    }

    Ok(match Roles::deserialize(deserializer)? {
        Roles::One(role) => vec![role],
        Roles::Many(roles) => roles,
        Roles::Missing(()) => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    //! Unit tests for auth::jwt.
    use serde_json::json;

    use super::*;

    fn token_with(payload: &serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.to_string());
        format!("{header}.{body}.sig")
    }

    /// Validates `decode_access_token` behavior for the numeric exp scenario.
    ///
    /// Assertions:
    /// - Confirms `claims.exp` equals `1_700_000_000`.
    /// - Confirms `issued_to()` prefers `azp` over `client_id`.
    #[test]
    fn test_decode_access_token_numeric_exp() {
        let token = token_with(&json!({"exp": 1_700_000_000, "azp": "web", "client_id": "other"}));
        let claims = decode_access_token(&token).unwrap();

        assert_eq!(claims.exp, 1_700_000_000);
        assert_eq!(claims.issued_to(), Some("web"));
    }

    /// Validates `decode_access_token` behavior for the string exp scenario.
    #[test]
    fn test_decode_access_token_string_exp() {
        let token = token_with(&json!({"exp": "1700000000"}));
        let claims = decode_access_token(&token).unwrap();

        assert_eq!(claims.exp, 1_700_000_000);
        assert_eq!(claims.issued_to(), None);
    }

    /// Validates `decode_access_token` behavior for the missing exp scenario.
    ///
    /// Assertions:
    /// - Ensures the result is `AuthError::Decoding`.
    #[test]
    fn test_decode_access_token_requires_exp() {
        let token = token_with(&json!({"sub": "user"}));
        assert!(matches!(decode_access_token(&token), Err(AuthError::Decoding(_))));
    }

    /// Validates `decode_claims` behavior for the malformed token scenario.
    #[test]
    fn test_malformed_tokens_are_decoding_errors() {
        for token in ["", "no-dots", "header.", "header.!!!.sig", "header.bm90IGpzb24.sig"] {
            let result = decode_claims::<serde_json::Value>(token);
            assert!(matches!(result, Err(AuthError::Decoding(_))), "token {token:?}");
        }
    }

    /// Validates `decode_claims` behavior for the padded standard alphabet
    /// scenario.
    #[test]
    fn test_decode_tolerates_padding_and_standard_alphabet() {
        let body = STANDARD_NO_PAD.encode(json!({"exp": 5, "email": "a?b>c"}).to_string());
        let token = format!("h.{body}==.s");

        let claims: serde_json::Value = decode_claims(&token).unwrap();
        assert_eq!(claims["exp"], 5);
    }

    /// Validates `UserProfile::from` behavior for the id token claims
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms names map from `given_name` / `family_name`.
    /// - Confirms missing claims become empty values.
    #[test]
    fn test_user_profile_from_id_token() {
        let token = token_with(&json!({
            "email": "ada@example.com",
            "given_name": "Ada",
            "family_name": "Lovelace",
            "roles": ["admin", "reader"]
        }));
        let user = UserProfile::from(decode_id_token(&token).unwrap());

        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.first_name, "Ada");
        assert_eq!(user.last_name, "Lovelace");
        assert!(user.has_role("admin"));

        let sparse = UserProfile::from(decode_id_token(&token_with(&json!({}))).unwrap());
        assert_eq!(sparse, UserProfile::default());
    }

    #[test]
    fn test_single_role_string() {
        let token = token_with(&json!({"roles": "admin"}));
        assert_eq!(decode_id_token(&token).unwrap().roles, vec!["admin".to_string()]);
    }
}
