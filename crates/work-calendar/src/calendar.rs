//! Working-time membership and duration arithmetic over a [`WorkCalendar`].
//!
//! A calendar answers one question, "is this instant working time?", and
//! builds three operations on top of it:
//!
//! - [`WorkCalendar::nearest_working_instant`]: snap an instant forward onto working time
//! - [`WorkCalendar::add_duration`]: advance an instant by an amount of working time
//! - [`WorkCalendar::get_duration`]: measure the working time between two instants
//!
//! All arithmetic is minute granular and timezone-naive. The two duration
//! operations are defined by a one-minute walk over the timeline, but are
//! evaluated a shift window at a time: non-working days and the gaps between
//! windows are skipped in a single step, and a window is consumed whole when
//! the remaining amount allows it. The results are identical to the walk.

use std::collections::BTreeSet;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::day_marker::DayMarker;
use crate::error::CalendarError;
use crate::shift::Shift;
use crate::work_days::WorkDays;

/// Holidays every default calendar excludes.
pub const COMMON_HOLIDAYS: [DayMarker; 9] = [
    DayMarker::from_parts(1, 1),
    DayMarker::from_parts(2, 1),
    DayMarker::from_parts(7, 1),
    DayMarker::from_parts(23, 2),
    DayMarker::from_parts(8, 3),
    DayMarker::from_parts(1, 5),
    DayMarker::from_parts(9, 5),
    DayMarker::from_parts(12, 6),
    DayMarker::from_parts(4, 11),
];

/// Number of distinct day markers, 29.02 included.
const MARKERS_PER_YEAR: usize = 366;

/// Working-time rules: recurring holiday exclusions, a weekday pattern and a
/// daily shift.
///
/// Immutable once built. The builder methods consume and return a new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkCalendar {
    exclusions: BTreeSet<DayMarker>,
    work_days: WorkDays,
    shift: Shift,
}

/// Where an instant sits relative to the working windows around it.
enum Segment {
    /// Not working time until the given instant.
    Idle(NaiveDateTime),
    /// Working time until the given instant (exclusive).
    Working(NaiveDateTime),
}

impl Default for WorkCalendar {
    /// Monday to Friday, 09:00 to 18:00, excluding [`COMMON_HOLIDAYS`].
    fn default() -> Self {
        Self::new(COMMON_HOLIDAYS, WorkDays::WEEKDAYS, Shift::DEFAULT)
    }
}

impl WorkCalendar {
    pub fn new<I>(exclusions: I, work_days: WorkDays, shift: Shift) -> Self
    where
        I: IntoIterator<Item = DayMarker>,
    {
        Self {
            exclusions: exclusions.into_iter().collect(),
            work_days,
            shift,
        }
    }

    /// Add holiday exclusions on top of the existing ones.
    #[must_use]
    pub fn with_exclusions<I>(mut self, exclusions: I) -> Self
    where
        I: IntoIterator<Item = DayMarker>,
    {
        self.exclusions.extend(exclusions);
        self
    }

    #[must_use]
    pub fn with_work_days(mut self, work_days: WorkDays) -> Self {
        self.work_days = work_days;
        self
    }

    #[must_use]
    pub fn with_shift(mut self, shift: Shift) -> Self {
        self.shift = shift;
        self
    }

    pub fn exclusions(&self) -> &BTreeSet<DayMarker> {
        &self.exclusions
    }

    pub fn work_days(&self) -> WorkDays {
        self.work_days
    }

    pub fn shift(&self) -> Shift {
        self.shift
    }

    pub fn shift_start(&self) -> Duration {
        self.shift.start()
    }

    pub fn shift_end(&self) -> Duration {
        self.shift.end()
    }

    pub fn shift_duration(&self) -> Duration {
        self.shift.duration()
    }

    /// Whether `date` is a holiday exclusion, regardless of weekday.
    pub fn is_excluded(&self, date: NaiveDate) -> bool {
        self.exclusions.contains(&DayMarker::of(date))
    }

    /// Whether `date` is a work day that is not excluded.
    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        self.work_days.contains(date.weekday()) && !self.is_excluded(date)
    }

    /// Whether `instant` is working time: on a working day and inside the
    /// shift window `[shift_start, shift_end)`.
    pub fn is_working_time(&self, instant: NaiveDateTime) -> bool {
        self.is_working_day(instant.date()) && self.shift.contains(instant.time())
    }

    /// Whether any instant at all can be working time.
    ///
    /// False for an empty work-day set or when every day of the year is
    /// excluded. If at least one marker is free it recurs every year and
    /// eventually falls on each weekday.
    pub fn has_working_time(&self) -> bool {
        !self.work_days.is_empty() && self.exclusions.len() < MARKERS_PER_YEAR
    }

    /// Snap `instant` onto working time.
    ///
    /// A working instant is returned unchanged. Any other instant moves to
    /// the shift start of the first working day *after* its own date, even
    /// when the instant is earlier than that same day's shift. An instant at
    /// 07:00 on a working Tuesday therefore snaps to Wednesday 09:00.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::NoWorkingTime`] if the calendar has no working
    /// time, or [`CalendarError::OutOfRange`] if the search runs past the
    /// representable dates.
    pub fn nearest_working_instant(
        &self,
        instant: NaiveDateTime,
    ) -> Result<NaiveDateTime, CalendarError> {
        if self.is_working_time(instant) {
            return Ok(instant);
        }
        if !self.has_working_time() {
            return Err(CalendarError::NoWorkingTime);
        }

        let mut date = next_day(instant.date())?;
        while !self.is_working_day(date) {
            date = next_day(date)?;
        }
        self.shift
            .opens_on(date)
            .ok_or_else(|| out_of_range(date))
    }

    /// Advance `start` by `duration` of working time.
    ///
    /// `start` is first snapped with [`nearest_working_instant`]. The walk
    /// then moves forward a minute at a time and a minute counts only when
    /// the instant it lands on is working time. Sub-minute remainders of
    /// `duration` are dropped.
    ///
    /// A result landing exactly on a shift start is reported as the end of the
    /// previous working day's shift instead, so a whole shift of work from
    /// 09:00 ends at 18:00 the same day rather than 09:00 the next.
    ///
    /// A duration shorter than a minute returns the snapped start.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidArgument`] for a negative duration, and
    /// the errors of [`nearest_working_instant`].
    ///
    /// [`nearest_working_instant`]: WorkCalendar::nearest_working_instant
    pub fn add_duration(
        &self,
        start: NaiveDateTime,
        duration: Duration,
    ) -> Result<NaiveDateTime, CalendarError> {
        if duration < Duration::zero() {
            return Err(CalendarError::InvalidArgument(format!(
                "duration must not be negative, got {}s",
                duration.num_seconds()
            )));
        }

        let snapped = self.nearest_working_instant(start)?;
        let minutes = duration.num_minutes();
        if minutes == 0 {
            return Ok(snapped);
        }

        let end = self.walk_forward(snapped, minutes)?;
        if self.shift.opens_at(end.time()) {
            self.previous_close(end.date())
        } else {
            Ok(end)
        }
    }

    /// [`add_duration`](WorkCalendar::add_duration) with the duration in seconds.
    pub fn add_seconds(
        &self,
        start: NaiveDateTime,
        seconds: i64,
    ) -> Result<NaiveDateTime, CalendarError> {
        let duration = Duration::try_seconds(seconds).ok_or_else(|| {
            CalendarError::InvalidArgument(format!("{seconds}s is not a valid duration"))
        })?;
        self.add_duration(start, duration)
    }

    /// Working time between `start` and `end`.
    ///
    /// Counts the instants `start + k minutes` before `end` that are working
    /// time, one minute each. Zero when `end <= start`.
    pub fn get_duration(&self, start: NaiveDateTime, end: NaiveDateTime) -> Duration {
        let mut minutes = 0i64;
        let mut t = start;

        while t < end {
            let steps = match self.segment_at(t) {
                Segment::Idle(until) => minutes_to_reach(t, until.min(end)),
                Segment::Working(until) => {
                    let counted = minutes_to_reach(t, until.min(end));
                    minutes += counted;
                    counted
                }
            };
            let Some(next) = t.checked_add_signed(Duration::minutes(steps)) else {
                break;
            };
            t = next;
        }

        Duration::minutes(minutes)
    }

    /// The `minutes`-th working instant strictly after `from`, on the
    /// one-minute grid through `from`.
    fn walk_forward(
        &self,
        from: NaiveDateTime,
        minutes: i64,
    ) -> Result<NaiveDateTime, CalendarError> {
        let mut remaining = minutes;
        let mut t = add_minutes(from, 1)?;

        loop {
            match self.segment_at(t) {
                Segment::Idle(until) => t = add_minutes(t, minutes_to_reach(t, until))?,
                Segment::Working(until) => {
                    let available = minutes_to_reach(t, until);
                    if remaining <= available {
                        return add_minutes(t, remaining - 1);
                    }
                    remaining -= available;
                    t = add_minutes(t, available)?;
                }
            }
        }
    }

    /// Shift end of the last working day before `date`.
    fn previous_close(&self, date: NaiveDate) -> Result<NaiveDateTime, CalendarError> {
        let mut day = date;
        loop {
            day = day.pred_opt().ok_or_else(|| out_of_range(day))?;
            if self.is_working_day(day) {
                break;
            }
        }
        self.shift.closes_on(day).ok_or_else(|| out_of_range(day))
    }

    /// Bounds past the last representable date are clamped to
    /// `NaiveDateTime::MAX`.
    fn segment_at(&self, t: NaiveDateTime) -> Segment {
        let date = t.date();
        let midnight = date
            .succ_opt()
            .map_or(NaiveDateTime::MAX, |d| d.and_time(NaiveTime::MIN));
        if !self.is_working_day(date) {
            return Segment::Idle(midnight);
        }

        let opens = self.shift.opens_on(date).unwrap_or(midnight);
        let closes = self.shift.closes_on(date).unwrap_or(NaiveDateTime::MAX);
        if t < opens {
            Segment::Idle(opens)
        } else if t < closes {
            Segment::Working(closes)
        } else {
            Segment::Idle(midnight)
        }
    }
}

/// Number of one-minute steps from `from` to the first grid point at or
/// after `to`. Expects `from < to`.
fn minutes_to_reach(from: NaiveDateTime, to: NaiveDateTime) -> i64 {
    let gap = to - from;
    let whole = gap.num_minutes();
    if gap > Duration::minutes(whole) {
        whole + 1
    } else {
        whole
    }
}

fn add_minutes(t: NaiveDateTime, minutes: i64) -> Result<NaiveDateTime, CalendarError> {
    t.checked_add_signed(Duration::minutes(minutes))
        .ok_or_else(|| out_of_range(t.date()))
}

fn next_day(date: NaiveDate) -> Result<NaiveDate, CalendarError> {
    date.succ_opt().ok_or_else(|| out_of_range(date))
}

fn out_of_range(date: NaiveDate) -> CalendarError {
    CalendarError::OutOfRange(format!("no working time representable near {date}"))
}

// ── Tests ───────────────────────────────────────────────────────────────────
