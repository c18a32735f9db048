//! Error types for work-calendar operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid shift: {0}")]
    InvalidShift(String),

    #[error("Invalid work days: {0}")]
    InvalidWorkDays(String),

    #[error("Invalid day marker: {0}")]
    InvalidDayMarker(String),

    #[error("No working time available: the calendar excludes every day")]
    NoWorkingTime,

    #[error("Out of range: {0}")]
    OutOfRange(String),
}

pub type Result<T> = std::result::Result<T, CalendarError>;
