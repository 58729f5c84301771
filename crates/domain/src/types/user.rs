//! User profile types
//!
//! The profile is derived from ID-token claims on every cache write and is
//! never fetched independently.

use serde::{Deserialize, Serialize};

/// Identity of the signed-in user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl UserProfile {
    /// `true` if the profile carries `role` (exact match).
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}
