// models/src/errors.rs

pub use thiserror::Error;

/// A validation error raised while building or updating domain records.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// A net id contains characters outside the allowed set.
    #[error("net id '{0}' is invalid")]
    InvalidNetId(String),
    /// A net id is empty or longer than the allowed maximum.
    #[error("net id has invalid length")]
    InvalidNetIdLength,
    /// A required field was absent or blank.
    #[error("{0} is required")]
    MissingField(&'static str),
    /// A ride would end at or before the moment it starts.
    #[error("endTime must be after startTime")]
    InvalidTimeRange,
    /// A ride must offer at least one seat.
    #[error("totalSeats must be at least 1")]
    InvalidSeatCount,
    /// An invalid date format was provided.
    #[error("invalid date format: {0}")]
    InvalidDateFormat(String),
}

/// A type alias for a `Result` that returns a `ValidationError` on failure.
pub type ValidationResult<T> = Result<T, ValidationError>;
