//! Scalar values read from host objects.

use jiff::{civil::Date, tz::TimeZone, Timestamp};
use serde::{Deserialize, Serialize};

/// A scalar attribute value as returned by [`crate::host::FieldAccess`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Decimal(f64),
    Boolean(bool),
    Date(Date),
    DateTime(Timestamp),
    /// Attribute exists but holds no value
    Empty,
}

impl FieldValue {
    /// Integer view of the value, accepting integral decimals and numeric
    /// text.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(n) => Some(*n),
            FieldValue::Decimal(d) if d.fract() == 0.0 => Some(*d as i64),
            FieldValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Calendar date of the value in the system time zone.
    ///
    /// Returns `None` for values that do not describe a valid day.
    pub fn as_date(&self) -> Option<Date> {
        self.as_date_in(&TimeZone::system())
    }

    /// Calendar date of the value, resolving instants in `tz`.
    pub fn as_date_in(&self, tz: &TimeZone) -> Option<Date> {
        match self {
            FieldValue::Date(date) => Some(*date),
            FieldValue::DateTime(ts) => Some(ts.to_zoned(tz.clone()).date()),
            FieldValue::Text(s) => {
                let s = s.trim();
                s.parse::<Date>()
                    .ok()
                    .or_else(|| s.parse::<Timestamp>().ok().map(|ts| ts.to_zoned(tz.clone()).date()))
            }
            _ => None,
        }
    }

    /// Plain text rendering used for titles.
    pub fn to_text(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Integer(n) => n.to_string(),
            FieldValue::Decimal(d) => d.to_string(),
            FieldValue::Boolean(b) => b.to_string(),
            FieldValue::Date(d) => d.to_string(),
            FieldValue::DateTime(ts) => ts.to_string(),
            FieldValue::Empty => String::new(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<Date> for FieldValue {
    fn from(value: Date) -> Self {
        FieldValue::Date(value)
    }
}
