//! Calendar arithmetic
//!
//! Schedules in this crate are counted in whole days of 24 hours from a UTC instant. There is no
//! time zone: a monthly plan is thirty days, not a calendar month.

use jiff::{SignedDuration, Timestamp};
use thiserror::Error;

use crate::errors::ErrorKind;

/// A date calculation left the supported range.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("adding {days} days to {from} is out of range: {reason}")]
pub struct CalendarError {
    /// Starting instant
    pub from: Timestamp,

    /// Days being added
    pub days: u32,

    /// Underlying message
    pub reason: String,
}

impl CalendarError {
    /// Classify the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        ErrorKind::Computation
    }
}

/// `from` plus `days` whole days.
///
/// # Errors
///
/// Returns [`CalendarError`] if the result is outside the range `jiff` supports.
pub fn add_days(from: Timestamp, days: u32) -> Result<Timestamp, CalendarError> {
    from.checked_add(SignedDuration::from_hours(i64::from(days) * 24))
        .map_err(|error| CalendarError {
            from,
            days,
            reason: error.to_string(),
        })
}
