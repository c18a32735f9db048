//! The set of weekdays a calendar treats as candidate working days.

use std::fmt;
use std::str::FromStr;

use chrono::Weekday;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CalendarError;

const ALL: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// A set of weekdays stored as a bitmask indexed by days from Sunday.
///
/// The textual form is a string of weekday digits, `0` = Sunday through
/// `6` = Saturday, so Monday..Friday is `"12345"`. On input `7` is also
/// read as Sunday, since some HR systems number the week 1..7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WorkDays(u8);

impl WorkDays {
    /// Monday through Friday.
    pub const WEEKDAYS: WorkDays = WorkDays(0b0011_1110);

    pub const fn empty() -> Self {
        WorkDays(0)
    }

    pub fn from_weekdays<I: IntoIterator<Item = Weekday>>(days: I) -> Self {
        days.into_iter().fold(Self::empty(), |set, day| set.with(day))
    }

    /// A copy of this set that also includes `day`.
    #[must_use]
    pub fn with(self, day: Weekday) -> Self {
        WorkDays(self.0 | bit(day))
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & bit(day) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Members in Sunday-first order.
    pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
        ALL.into_iter().filter(move |day| self.contains(*day))
    }
}

fn bit(day: Weekday) -> u8 {
    1 << day.num_days_from_sunday()
}

impl fmt::Display for WorkDays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for day in self.iter() {
            write!(f, "{}", day.num_days_from_sunday())?;
        }
        Ok(())
    }
}

impl FromStr for WorkDays {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().chars().try_fold(Self::empty(), |set, ch| {
            let day = match ch {
                '0' | '7' => Weekday::Sun,
                '1' => Weekday::Mon,
                '2' => Weekday::Tue,
                '3' => Weekday::Wed,
                '4' => Weekday::Thu,
                '5' => Weekday::Fri,
                '6' => Weekday::Sat,
                _ => {
                    return Err(CalendarError::InvalidWorkDays(format!(
                        "unknown weekday digit '{ch}' in '{s}'"
                    )))
                }
            };
            Ok(set.with(day))
        })
    }
}

impl Serialize for WorkDays {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for WorkDays {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
