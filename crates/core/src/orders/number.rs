//! Order numbers

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::errors::ParseEnumError;

/// Human-readable order number: `NC`, the last six digits of the millisecond clock and a
/// three-digit random suffix, e.g. `NC482913007`.
///
/// Numbers are not guaranteed unique. The order store rejects duplicates and the caller draws a
/// fresh number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Prefix shared by every order number.
    pub const PREFIX: &'static str = "NC";

    const DIGITS: usize = 9;

    /// Draw a number for an order placed at `now`.
    pub fn generate<R: Rng + ?Sized>(now: Timestamp, rng: &mut R) -> Self {
        let clock = now.as_millisecond().rem_euclid(1_000_000);
        let suffix: u16 = rng.gen_range(0..1000);

        Self(format!("{}{clock:06}{suffix:03}", Self::PREFIX))
    }

    /// The number as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for OrderNumber {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        let valid = trimmed.strip_prefix(Self::PREFIX).is_some_and(|digits| {
            digits.len() == Self::DIGITS && digits.bytes().all(|byte| byte.is_ascii_digit())
        });

        if valid {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(ParseEnumError::new("order number", s))
        }
    }
}

impl TryFrom<String> for OrderNumber {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OrderNumber> for String {
    fn from(value: OrderNumber) -> Self {
        value.0
    }
}
