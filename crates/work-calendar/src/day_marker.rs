//! Recurring calendar dates keyed by month and day.
//!
//! A [`DayMarker`] names a date with no year, so a holiday declared once
//! recurs every year. Its textual form is `"DD.MM"` with both parts zero
//! padded, which is the format HR systems use when sending exclusion dates.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CalendarError;

/// Largest day number per month, using the leap-year maximum for February.
const MAX_DAY: [u8; 12] = [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// A month + day pair, ordered by month first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayMarker {
    month: u8,
    day: u8,
}

impl DayMarker {
    /// Create a marker for `day`.`month`.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidDayMarker`] if the month is outside
    /// 1..=12 or the day does not exist in that month in a leap year.
    pub fn new(day: u8, month: u8) -> Result<Self, CalendarError> {
        if !(1..=12).contains(&month) {
            return Err(CalendarError::InvalidDayMarker(format!(
                "month {month} is out of range"
            )));
        }
        if day == 0 || day > MAX_DAY[usize::from(month - 1)] {
            return Err(CalendarError::InvalidDayMarker(format!(
                "day {day} does not exist in month {month:02}"
            )));
        }
        Ok(Self { month, day })
    }

    /// Unchecked constructor for the built-in constant tables.
    pub(crate) const fn from_parts(day: u8, month: u8) -> Self {
        Self { month, day }
    }

    /// Parse a marker from separate day and month keys, as found in the
    /// nested exclusion maps (`"1"` / `"01"` are both accepted for a part).
    pub fn from_keys(day: &str, month: &str) -> Result<Self, CalendarError> {
        let day = parse_part(day, "day")?;
        let month = parse_part(month, "month")?;
        Self::new(day, month)
    }

    /// The marker of the calendar day `date` falls on.
    pub fn of(date: NaiveDate) -> Self {
        // chrono guarantees month 1..=12 and day 1..=31
        Self {
            month: date.month() as u8,
            day: date.day() as u8,
        }
    }

    pub fn day(&self) -> u8 {
        self.day
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    /// Whether `date` falls on this marker in its year.
    pub fn matches(&self, date: NaiveDate) -> bool {
        Self::of(date) == *self
    }
}

fn parse_part(s: &str, what: &str) -> Result<u8, CalendarError> {
    let s = s.trim();
    if s.is_empty() || s.len() > 2 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CalendarError::InvalidDayMarker(format!(
            "{what} must be one or two digits, got '{s}'"
        )));
    }
    s.parse()
        .map_err(|_| CalendarError::InvalidDayMarker(format!("invalid {what} '{s}'")))
}

impl fmt::Display for DayMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}.{:02}", self.day, self.month)
    }
}

impl FromStr for DayMarker {
    type Err = CalendarError;

    /// Parse the canonical `"DD.MM"` form. Both parts must be exactly two digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (day, month) = s.split_once('.').ok_or_else(|| {
            CalendarError::InvalidDayMarker(format!("expected 'DD.MM', got '{s}'"))
        })?;
        if day.len() != 2 || month.len() != 2 {
            return Err(CalendarError::InvalidDayMarker(format!(
                "expected zero-padded 'DD.MM', got '{s}'"
            )));
        }
        Self::from_keys(day, month)
    }
}

impl Serialize for DayMarker {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DayMarker {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
