// models/src/identifiers.rs

use core::ops::Deref;
use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::{ValidationError, ValidationResult};

/// Longest net id accepted from the SSO provider.
pub const MAX_NET_ID_LEN: usize = 64;

/// An institutional user identifier, as returned by the CAS server.
///
/// Net ids are between 1 and 64 bytes and only contain ASCII alphanumerics,
/// `.`, `_` or `-`. They are used verbatim as storage keys.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct NetId(String);

impl NetId {
    /// Creates a new net id.
    ///
    /// # Errors
    /// Returns a `ValidationError` if `value` is empty, too long, or contains
    /// characters outside the allowed set.
    pub fn new(value: String) -> ValidationResult<Self> {
        if value.is_empty() || value.len() > MAX_NET_ID_LEN {
            return Err(ValidationError::InvalidNetIdLength);
        }
        let valid = value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
        if !valid {
            return Err(ValidationError::InvalidNetId(value));
        }

        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for NetId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for NetId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromStr for NetId {
    type Err = ValidationError;

    fn from_str(s: &str) -> ValidationResult<Self> {
        Self::new(s.to_string())
    }
}

impl TryFrom<String> for NetId {
    type Error = ValidationError;

    fn try_from(value: String) -> ValidationResult<Self> {
        Self::new(value)
    }
}

impl fmt::Display for NetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<NetId> for String {
    fn from(value: NetId) -> Self {
        value.0
    }
}
