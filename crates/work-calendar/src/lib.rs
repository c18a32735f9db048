//! # work-calendar
//!
//! Business working-time arithmetic.
//!
//! A [`WorkCalendar`] decides which instants are working time from three
//! rules: a set of recurring holiday dates, a weekday pattern, and a daily
//! shift window. On top of that it snaps instants onto working time, adds
//! working durations to instants, and measures the working time between two
//! instants. All values are timezone-naive and the arithmetic is minute
//! granular.
//!
//! ## Modules
//!
//! - [`calendar`] — `WorkCalendar` and its arithmetic
//! - [`config`] — Raw HR-system schedule data → `WorkCalendar`
//! - [`day_marker`] — `"DD.MM"` recurring dates
//! - [`work_days`] — Weekday sets
//! - [`shift`] — The daily work window
//! - [`error`] — Error types
//!
//! ## Example
//!
//! ```
//! use chrono::{Duration, NaiveDate};
//! use work_calendar::WorkCalendar;
//!
//! let calendar = WorkCalendar::default();
//! // Wednesday 2024-01-03, 09:00
//! let start = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap().and_hms_opt(9, 0, 0).unwrap();
//! let end = calendar.add_duration(start, Duration::hours(9)).unwrap();
//! assert_eq!(end, start + Duration::hours(9));
//! assert_eq!(calendar.get_duration(start, end), Duration::hours(9));
//! ```

pub mod calendar;
pub mod config;
pub mod day_marker;
pub mod error;
pub mod shift;
pub mod work_days;

pub use calendar::{WorkCalendar, COMMON_HOLIDAYS};
pub use config::{ScheduleConfig, ShiftSettings};
pub use day_marker::DayMarker;
pub use error::{CalendarError, Result};
pub use shift::Shift;
pub use work_days::WorkDays;
