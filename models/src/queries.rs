// models/src/queries.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::rides::Ride;

/// An absolute, inclusive datetime range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateTimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// The coarse, storage-level ride filter.
///
/// Only open rides pass. `from` and `to` are case-insensitive substrings of
/// `beginning` and `destination`; an empty or absent value matches anything.
/// When `range` is set a ride passes if it starts at or before the range end
/// and ends at or after the range start.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RideFilter {
    pub from: Option<String>,
    pub to: Option<String>,
    pub range: Option<DateTimeRange>,
}

fn contains_ignore_case(haystack: &str, needle: Option<&str>) -> bool {
    match needle {
        Some(needle) if !needle.is_empty() => haystack
            .to_lowercase()
            .contains(&needle.to_lowercase()),
        _ => true,
    }
}

impl RideFilter {
    pub fn matches(&self, ride: &Ride) -> bool {
        if ride.is_closed {
            return false;
        }
        if !contains_ignore_case(&ride.beginning, self.from.as_deref())
            || !contains_ignore_case(&ride.destination, self.to.as_deref())
        {
            return false;
        }
        match &self.range {
            Some(range) => ride.start_time <= range.end && ride.end_time >= range.start,
            None => true,
        }
    }
}
