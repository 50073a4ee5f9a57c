//! Core error types for examgate-core.
//!
//! Classification itself never fails. These types cover the two boundaries
//! where input arrives from outside: per-field parameter rejection
//! ([`ParamError`], always recovered from) and fatal surface errors
//! ([`CoreError`]) such as an unparseable URL handed to the CLI.

use thiserror::Error;

/// Core error type for examgate-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The address could not be parsed as a URL
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// A point in time could not be interpreted
    #[error("Invalid instant '{0}': expected HH:MM or an RFC 3339 timestamp")]
    InvalidInstant(String),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Rejection of one settings field.
///
/// The acceptance boundary logs these and keeps the prior or default value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParamError {
    /// Not of the form `HH:MM`
    #[error("'{value}' is not a time of the form HH:MM")]
    InvalidTime { value: String },

    /// `HH:MM` with hours or minutes outside the clock range
    #[error("{hours:02}:{minutes:02} is outside 00:00-23:59")]
    TimeOutOfRange { hours: u32, minutes: u32 },

    /// Not a decimal integer
    #[error("'{value}' is not a whole number of minutes for '{key}'")]
    InvalidMinutes { key: &'static str, value: String },

    /// Zero where a positive duration is required
    #[error("'{key}' must be greater than zero")]
    ZeroMinutes { key: &'static str },

    /// The wall time does not exist on the current date (DST gap)
    #[error("{time} does not exist on {date} in the local time zone")]
    NonexistentLocalTime {
        date: chrono::NaiveDate,
        time: chrono::NaiveTime,
    },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
