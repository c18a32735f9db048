//! The daily work window.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::Serialize;

use crate::error::CalendarError;

pub(crate) const SECONDS_PER_DAY: i64 = 86_400;

/// A daily window `[start, end)` expressed as offsets from midnight.
///
/// Invariant: `0 <= start < end <= 24h`, both whole seconds. `end` may be
/// exactly 24h, meaning the shift runs until midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shift {
    start: i64,
    end: i64,
}

impl Shift {
    /// 09:00:00 to 18:00:00.
    pub const DEFAULT: Shift = Shift {
        start: 32_400,
        end: 64_800,
    };

    /// Create a shift from time-of-day offsets.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidShift`] unless both offsets are whole
    /// seconds within the day and `start < end`.
    pub fn new(start: Duration, end: Duration) -> Result<Self, CalendarError> {
        if start.subsec_nanos() != 0 || end.subsec_nanos() != 0 {
            return Err(CalendarError::InvalidShift(
                "shift bounds must be whole seconds".to_string(),
            ));
        }
        Self::from_seconds(start.num_seconds(), end.num_seconds())
    }

    /// Create a shift from seconds since midnight.
    pub fn from_seconds(start: i64, end: i64) -> Result<Self, CalendarError> {
        if !(0..SECONDS_PER_DAY).contains(&start) {
            return Err(CalendarError::InvalidShift(format!(
                "start {start}s is outside the day"
            )));
        }
        if end > SECONDS_PER_DAY {
            return Err(CalendarError::InvalidShift(format!(
                "end {end}s is outside the day"
            )));
        }
        if start >= end {
            return Err(CalendarError::InvalidShift(format!(
                "start {start}s must be before end {end}s"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> Duration {
        Duration::seconds(self.start)
    }

    pub fn end(&self) -> Duration {
        Duration::seconds(self.end)
    }

    /// Length of the window. Derived, so it always agrees with the bounds.
    pub fn duration(&self) -> Duration {
        Duration::seconds(self.end - self.start)
    }

    pub fn start_seconds(&self) -> i64 {
        self.start
    }

    pub fn end_seconds(&self) -> i64 {
        self.end
    }

    /// Whether a time-of-day lies in `[start, end)`. Sub-second parts are ignored.
    pub fn contains(&self, time: NaiveTime) -> bool {
        let offset = i64::from(time.num_seconds_from_midnight());
        self.start <= offset && offset < self.end
    }

    /// Whether `time` is exactly the opening time, to the second.
    pub fn opens_at(&self, time: NaiveTime) -> bool {
        i64::from(time.num_seconds_from_midnight()) == self.start
    }

    /// The instant the shift opens on `date`.
    pub fn opens_on(&self, date: NaiveDate) -> Option<NaiveDateTime> {
        date.and_time(NaiveTime::MIN)
            .checked_add_signed(Duration::seconds(self.start))
    }

    /// The instant the shift closes on `date`; the next midnight for a 24h end.
    pub fn closes_on(&self, date: NaiveDate) -> Option<NaiveDateTime> {
        date.and_time(NaiveTime::MIN)
            .checked_add_signed(Duration::seconds(self.end))
    }
}

impl Default for Shift {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Serialized as seconds since midnight, matching the inbound configuration.
impl Serialize for Shift {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("Shift", 3)?;
        state.serialize_field("start_seconds", &self.start)?;
        state.serialize_field("end_seconds", &self.end)?;
        state.serialize_field("duration_seconds", &(self.end - self.start))?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    #[test]
    fn test_default_is_nine_to_six() {
        let shift = Shift::default();
        assert_eq!(shift.start(), Duration::hours(9));
        assert_eq!(shift.end(), Duration::hours(18));
        assert_eq!(shift.duration(), Duration::hours(9));
    }

    #[test]
    fn test_contains_is_half_open() {
        let shift = Shift::default();
        assert!(shift.contains(time(9, 0, 0)));
        assert!(shift.contains(time(17, 59, 59)));
        assert!(!shift.contains(time(18, 0, 0)));
        assert!(!shift.contains(time(8, 59, 59)));
    }

    #[test]
    fn test_contains_ignores_subseconds() {
        let shift = Shift::default();
        let almost_six = NaiveTime::from_hms_milli_opt(17, 59, 59, 999).unwrap();
        assert!(shift.contains(almost_six));
        let almost_nine = NaiveTime::from_hms_milli_opt(8, 59, 59, 999).unwrap();
        assert!(!shift.contains(almost_nine));
    }

    #[test]
    fn test_rejects_inverted_and_empty_windows() {
        assert!(Shift::from_seconds(64_800, 32_400).is_err());
        let err = Shift::from_seconds(32_400, 32_400).unwrap_err().to_string();
        assert!(err.contains("Invalid shift"), "got: {err}");
    }

    #[test]
    fn test_rejects_out_of_day_bounds() {
        assert!(Shift::from_seconds(-1, 3_600).is_err());
        assert!(Shift::from_seconds(0, SECONDS_PER_DAY + 1).is_err());
        assert!(Shift::from_seconds(SECONDS_PER_DAY, SECONDS_PER_DAY).is_err());
    }

    #[test]
    fn test_rejects_subsecond_bounds() {
        let start = Duration::milliseconds(32_400_500);
        assert!(Shift::new(start, Duration::hours(18)).is_err());
    }

    #[test]
    fn test_full_day_shift_closes_at_next_midnight() {
        let shift = Shift::from_seconds(0, SECONDS_PER_DAY).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert!(shift.contains(time(23, 59, 59)));
        assert_eq!(
            shift.closes_on(date),
            NaiveDate::from_ymd_opt(2024, 1, 3)
                .unwrap()
                .and_hms_opt(0, 0, 0)
        );
    }

    #[test]
    fn test_opens_on() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(Shift::default().opens_on(date), date.and_hms_opt(9, 0, 0));
        assert!(Shift::default().opens_at(time(9, 0, 0)));
        assert!(!Shift::default().opens_at(time(9, 0, 1)));
    }
}
