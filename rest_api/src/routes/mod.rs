// rest_api/src/routes/mod.rs

pub mod admin;
pub mod auth;
pub mod bookmarks;
pub mod pages;
pub mod rides;
pub mod system;

use models::{NetId, User};
use security::DirectoryPerson;
use uuid::Uuid;

use crate::errors::{ApiResult, RestApiError};

/// Account used by the development login and by database resets.
pub(crate) const TEST_NET_ID: &str = "testuser";

pub(crate) fn test_person() -> DirectoryPerson {
    DirectoryPerson {
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        email: "test.user@yale.edu".to_string(),
    }
}

pub(crate) fn test_user() -> ApiResult<(NetId, User)> {
    let net_id = NetId::new(TEST_NET_ID.to_string())?;
    let person = test_person();
    let user = User::new(net_id.clone(), &person.first_name, &person.last_name, &person.email);
    Ok((net_id, user))
}

/// Parses a client supplied ride id; `missing` is the message used when it is absent.
pub(crate) fn parse_ride_id(raw: Option<&str>, missing: &str) -> ApiResult<Uuid> {
    let raw = raw
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| RestApiError::BadRequest(missing.to_string()))?;
    Uuid::parse_str(raw).map_err(|_| RestApiError::BadRequest("Invalid rideId".to_string()))
}
