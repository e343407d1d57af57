// models/src/users.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identifiers::NetId;

// --- Stored User Struct ---
// Users are created on their first successful SSO login; there is no password.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub net_id: NetId,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(net_id: NetId, first_name: &str, last_name: &str, email: &str) -> Self {
        User {
            net_id,
            name: full_name(first_name, last_name),
            email: email.to_string(),
            created_at: Utc::now(),
        }
    }
}

/// The identity carried by a verified session token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedUser {
    pub net_id: NetId,
    pub name: String,
    pub email: String,
}

impl From<&User> for AuthenticatedUser {
    fn from(user: &User) -> Self {
        AuthenticatedUser {
            net_id: user.net_id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

/// Joins first and last name, dropping the separator when either is blank.
pub fn full_name(first_name: &str, last_name: &str) -> String {
    format!("{} {}", first_name.trim(), last_name.trim())
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_join_names() {
        assert_eq!(full_name("Test", "User"), "Test User");
        assert_eq!(full_name("", "User"), "User");
        assert_eq!(full_name("Test", " "), "Test");
    }
}
