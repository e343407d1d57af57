// security/src/lib.rs

pub mod cas;
pub mod directory;
pub mod middleware;
pub mod redirect;

use std::fmt;

use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use models::users::full_name;
use models::{AuthenticatedUser, NetId};
use serde::{Deserialize, Serialize};

pub use cas::{CasClient, CasResponse, TicketValidator};
pub use directory::{DirectoryClient, DirectoryLookup, DirectoryPerson};
pub use middleware::{CurrentUser, require_auth};

/// Name of the cookie carrying the session token.
pub const AUTH_COOKIE: &str = "auth";

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub net_id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Custom authentication errors.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthError {
    MissingSecret,
    TokenCreation(String),
    InvalidToken(String),
    InvalidIdentity(String),
    CasRequest(String),
    Directory(String),
    Configuration(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AuthError::MissingSecret => write!(f, "JWT secret is not configured"),
            AuthError::TokenCreation(msg) => write!(f, "Failed to create token: {}", msg),
            AuthError::InvalidToken(msg) => write!(f, "Invalid token: {}", msg),
            AuthError::InvalidIdentity(msg) => write!(f, "Invalid identity: {}", msg),
            AuthError::CasRequest(msg) => write!(f, "CAS request failed: {}", msg),
            AuthError::Directory(msg) => write!(f, "Directory lookup failed: {}", msg),
            AuthError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}

/// Signs and verifies HS256 session tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("TokenIssuer").field("ttl", &self.ttl).finish()
    }
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl: Duration) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::MissingSecret);
        }
        if ttl <= Duration::zero() {
            return Err(AuthError::Configuration("token lifetime must be positive".to_string()));
        }
        Ok(TokenIssuer {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, net_id: &NetId, person: &DirectoryPerson) -> Result<String, AuthError> {
        self.issue_at(net_id, person, Utc::now())
    }

    pub fn issue_at(
        &self,
        net_id: &NetId,
        person: &DirectoryPerson,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let claims = Claims {
            net_id: net_id.to_string(),
            first_name: person.first_name.clone(),
            last_name: person.last_name.clone(),
            email: person.email.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenCreation(e.to_string()))
    }

    /// Decodes `token`, checking signature and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    /// Verifies `token` and returns the user it identifies.
    pub fn authenticate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let claims = self.verify(token)?;
        let net_id = NetId::new(claims.net_id)
            .map_err(|e| AuthError::InvalidIdentity(e.to_string()))?;
        Ok(AuthenticatedUser {
            net_id,
            name: full_name(&claims.first_name, &claims.last_name),
            email: claims.email,
        })
    }

    /// The session cookie for `token`, expiring together with it.
    pub fn session_cookie(&self, token: String, secure: bool) -> Cookie<'static> {
        Cookie::build((AUTH_COOKIE, token))
            .http_only(true)
            .path("/")
            .same_site(SameSite::Lax)
            .secure(secure)
            .max_age(time::Duration::seconds(self.ttl.num_seconds()))
            .build()
    }
}

/// A cookie that makes the browser drop the session cookie.
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE, "")).path("/").build()
}
