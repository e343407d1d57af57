// models/src/rides.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{ValidationError, ValidationResult};
use crate::identifiers::NetId;
use crate::users::AuthenticatedUser;

/// Seats offered when a ride is posted without an explicit count.
pub const DEFAULT_TOTAL_SEATS: u32 = 4;

/// Anything with an absolute active interval `[start_time, end_time)`.
pub trait ActiveInterval {
    fn start_time(&self) -> DateTime<Utc>;
    fn end_time(&self) -> DateTime<Utc>;
}

impl<T: ActiveInterval + ?Sized> ActiveInterval for &T {
    fn start_time(&self) -> DateTime<Utc> {
        (**self).start_time()
    }

    fn end_time(&self) -> DateTime<Utc> {
        (**self).end_time()
    }
}

// --- Stored Ride Struct ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ride {
    pub ride_id: Uuid,
    pub owner_net_id: NetId,
    pub owner_name: String,
    pub owner_email: String,
    pub owner_phone: String,
    pub beginning: String,
    pub destination: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub total_seats: u32,
    pub current_taken_seats: u32,
    pub is_closed: bool,
    pub has_car: bool,
    pub created_at: DateTime<Utc>,
}

// --- DTO for posting a ride ---
// `departure` is accepted as an older spelling of `beginning`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRide {
    #[serde(default)]
    pub beginning: Option<String>,
    #[serde(default)]
    pub departure: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_seats: Option<u32>,
    #[serde(default)]
    pub owner_phone: Option<String>,
    #[serde(default)]
    pub has_car: Option<bool>,
}

// --- DTO for editing a ride. Absent fields are left untouched. ---
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RideUpdate {
    #[serde(default)]
    pub beginning: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_seats: Option<u32>,
    #[serde(default)]
    pub owner_name: Option<String>,
    #[serde(default)]
    pub owner_phone: Option<String>,
    #[serde(default)]
    pub has_car: Option<bool>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Ride {
    /// Builds an open ride owned by `owner` from a posted `NewRide`.
    pub fn from_new_ride(new_ride: NewRide, owner: &AuthenticatedUser) -> ValidationResult<Self> {
        let beginning = non_blank(new_ride.beginning)
            .or_else(|| non_blank(new_ride.departure))
            .ok_or(ValidationError::MissingField("beginning"))?;
        let destination =
            non_blank(new_ride.destination).ok_or(ValidationError::MissingField("destination"))?;
        let start_time = new_ride
            .start_time
            .ok_or(ValidationError::MissingField("startTime"))?;
        let end_time = new_ride
            .end_time
            .ok_or(ValidationError::MissingField("endTime"))?;
        if end_time <= start_time {
            return Err(ValidationError::InvalidTimeRange);
        }
        let total_seats = new_ride.total_seats.unwrap_or(DEFAULT_TOTAL_SEATS);
        if total_seats == 0 {
            return Err(ValidationError::InvalidSeatCount);
        }

        Ok(Ride {
            ride_id: Uuid::new_v4(),
            owner_net_id: owner.net_id.clone(),
            owner_name: owner.name.clone(),
            owner_email: owner.email.clone(),
            owner_phone: new_ride.owner_phone.unwrap_or_default(),
            beginning,
            destination,
            description: new_ride.description.unwrap_or_default(),
            start_time,
            end_time,
            total_seats,
            current_taken_seats: 0,
            is_closed: false,
            has_car: new_ride.has_car.unwrap_or(false),
            created_at: Utc::now(),
        })
    }

    /// Applies a partial edit, returning the edited copy.
    pub fn with_update(&self, update: RideUpdate) -> ValidationResult<Self> {
        let mut ride = self.clone();
        if let Some(beginning) = update.beginning {
            ride.beginning =
                non_blank(Some(beginning)).ok_or(ValidationError::MissingField("beginning"))?;
        }
        if let Some(destination) = update.destination {
            ride.destination =
                non_blank(Some(destination)).ok_or(ValidationError::MissingField("destination"))?;
        }
        if let Some(description) = update.description {
            ride.description = description;
        }
        if let Some(start_time) = update.start_time {
            ride.start_time = start_time;
        }
        if let Some(end_time) = update.end_time {
            ride.end_time = end_time;
        }
        if let Some(total_seats) = update.total_seats {
            if total_seats == 0 {
                return Err(ValidationError::InvalidSeatCount);
            }
            ride.total_seats = total_seats;
        }
        if let Some(owner_name) = update.owner_name {
            ride.owner_name = owner_name;
        }
        if let Some(owner_phone) = update.owner_phone {
            ride.owner_phone = owner_phone;
        }
        if let Some(has_car) = update.has_car {
            ride.has_car = has_car;
        }
        if ride.end_time <= ride.start_time {
            return Err(ValidationError::InvalidTimeRange);
        }
        Ok(ride)
    }

    pub fn is_owned_by(&self, net_id: &NetId) -> bool {
        &self.owner_net_id == net_id
    }

    /// True once the ride has ended relative to `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.end_time < now
    }
}

impl ActiveInterval for Ride {
    fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn owner() -> AuthenticatedUser {
        AuthenticatedUser {
            net_id: NetId::new("abc123".to_string()).unwrap(),
            name: "Ada Lovelace".to_string(),
            email: "ada@example.edu".to_string(),
        }
    }

    fn new_ride() -> NewRide {
        NewRide {
            beginning: Some("New Haven".to_string()),
            destination: Some("JFK".to_string()),
            start_time: Some(Utc.with_ymd_and_hms(2024, 5, 1, 14, 0, 0).unwrap()),
            end_time: Some(Utc.with_ymd_and_hms(2024, 5, 1, 16, 0, 0).unwrap()),
            ..Default::default()
        }
    }

    #[test]
    fn should_fill_defaults_from_owner() {
        let ride = Ride::from_new_ride(new_ride(), &owner()).unwrap();
        assert_eq!(ride.owner_net_id.as_str(), "abc123");
        assert_eq!(ride.owner_name, "Ada Lovelace");
        assert_eq!(ride.total_seats, DEFAULT_TOTAL_SEATS);
        assert_eq!(ride.current_taken_seats, 0);
        assert!(!ride.is_closed);
        assert!(!ride.has_car);
        assert_eq!(ride.description, "");
    }

    #[test]
    fn should_accept_departure_alias() {
        let mut posted = new_ride();
        posted.beginning = None;
        posted.departure = Some("Union Station".to_string());
        let ride = Ride::from_new_ride(posted, &owner()).unwrap();
        assert_eq!(ride.beginning, "Union Station");
    }

    #[test]
    fn should_require_locations() {
        let mut posted = new_ride();
        posted.destination = Some("   ".to_string());
        assert_eq!(
            Ride::from_new_ride(posted, &owner()).unwrap_err(),
            ValidationError::MissingField("destination")
        );
    }

    #[test]
    fn should_reject_inverted_time_range() {
        let mut posted = new_ride();
        posted.end_time = posted.start_time;
        assert_eq!(
            Ride::from_new_ride(posted, &owner()).unwrap_err(),
            ValidationError::InvalidTimeRange
        );
    }

    #[test]
    fn should_apply_partial_update() {
        let ride = Ride::from_new_ride(new_ride(), &owner()).unwrap();
        let updated = ride
            .with_update(RideUpdate {
                destination: Some("Logan".to_string()),
                has_car: Some(true),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(updated.destination, "Logan");
        assert!(updated.has_car);
        assert_eq!(updated.beginning, ride.beginning);
        assert_eq!(updated.ride_id, ride.ride_id);
    }

    #[test]
    fn should_serialize_with_camel_case() {
        let ride = Ride::from_new_ride(new_ride(), &owner()).unwrap();
        let json = serde_json::to_value(&ride).unwrap();
        assert_eq!(json["ownerNetId"], "abc123");
        assert_eq!(json["isClosed"], false);
        assert!(json.get("startTime").is_some());
    }
}
