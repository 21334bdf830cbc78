//! Stable string keys for calendar days.
//!
//! A [`DateKey`] identifies one grid column. It is the zero-padded
//! `YYYYMMDD` rendering of the date behind a non-numeric sentinel so that
//! hosts which reorder numeric-looking map keys leave it alone. Years
//! before 0 put a `-` ahead of the four year digits.

use std::{fmt, str::FromStr};

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};

/// Prefix placed in front of every encoded key.
pub const DATE_KEY_SENTINEL: char = 'r';

/// Column identifier for one calendar day.
///
/// Ordering follows the string form, which matches calendar order for the
/// years 0 through 9999.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateKey(String);

impl DateKey {
    /// Encodes a calendar date.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use jiff::civil::date;
    /// use rota_core::calendar::DateKey;
    ///
    /// let key = DateKey::encode(date(2024, 2, 29));
    /// assert_eq!(key.as_str(), "r20240229");
    /// assert_eq!(key.decode().unwrap(), date(2024, 2, 29));
    /// ```
    pub fn encode(date: Date) -> Self {
        let sign = if date.year() < 0 { "-" } else { "" };
        Self(format!(
            "{}{}{:04}{:02}{:02}",
            DATE_KEY_SENTINEL,
            sign,
            date.year().unsigned_abs(),
            date.month(),
            date.day()
        ))
    }

    /// Decodes the key back into the calendar date it was built from.
    pub fn decode(&self) -> Result<Date> {
        decode(&self.0)
    }

    /// Borrow the raw key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Decodes a raw key string.
///
/// # Errors
///
/// Returns `PlannerError::InvalidInput` when the sentinel is missing, the
/// digits are malformed, or they do not name a real calendar day.
pub fn decode(key: &str) -> Result<Date> {
    let invalid = |reason: &str| PlannerError::invalid_input("date_key").with_reason(format!("{reason}: '{key}'"));

    let digits = key
        .strip_prefix(DATE_KEY_SENTINEL)
        .ok_or_else(|| invalid("missing sentinel"))?;
    if digits.len() < 8 || !digits.is_ascii() {
        return Err(invalid("too short"));
    }

    let (year, month_day) = digits.split_at(digits.len() - 4);
    let (month, day) = month_day.split_at(2);

    let year: i16 = year.parse().map_err(|_| invalid("bad year"))?;
    let month: i8 = month.parse().map_err(|_| invalid("bad month"))?;
    let day: i8 = day.parse().map_err(|_| invalid("bad day"))?;

    Date::new(year, month, day).map_err(|e| invalid(&e.to_string()))
}

impl From<Date> for DateKey {
    fn from(date: Date) -> Self {
        Self::encode(date)
    }
}

impl FromStr for DateKey {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self> {
        // Re-encode so that equal dates always produce byte-equal keys.
        decode(s).map(Self::encode)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
