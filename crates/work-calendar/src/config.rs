//! Translation of raw HR-system schedule data into a [`WorkCalendar`].
//!
//! The schedule arrives as JSON already fetched by the caller:
//!
//! ```json
//! {
//!   "EXCLUSIONS": { "EXCLUSIONS": { "2024": { "01": { "3": "0" } } } },
//!   "SHIFTS": [
//!     { "WORK_DAYS": "12345", "WORK_TIME_START": 32400, "WORK_TIME_END": 64800 }
//!   ]
//! }
//! ```
//!
//! The exclusion tree is grouping → month → day → flag, where the flag `"0"`
//! marks a non-working day. Any level of the tree may be missing or be a
//! non-object (the HR system sends `[]` for an empty map); such levels are
//! read as empty. Only the first shift is used.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::calendar::WorkCalendar;
use crate::day_marker::DayMarker;
use crate::error::CalendarError;
use crate::shift::Shift;
use crate::work_days::WorkDays;

/// Flag value marking a non-working day in the exclusion tree.
const NON_WORKING: &str = "0";

/// Raw schedule data as sent by the HR system.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(rename = "EXCLUSIONS", default)]
    pub exclusions: Value,
    #[serde(rename = "SHIFTS", default)]
    pub shifts: Value,
}

/// Work days and shift window read from a shift record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftSettings {
    pub work_days: WorkDays,
    pub shift: Shift,
}

impl ScheduleConfig {
    /// Parse a schedule from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if `json` is not a schedule object.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Day markers flagged as non-working in the exclusion tree.
    ///
    /// Keys that cannot form a valid `DD.MM` marker can never match a date
    /// and are skipped.
    pub fn extra_exclusions(&self) -> BTreeSet<DayMarker> {
        let mut markers = BTreeSet::new();
        let groups = self
            .exclusions
            .get("EXCLUSIONS")
            .and_then(Value::as_object);

        for months in groups.into_iter().flat_map(Map::values) {
            for (month, days) in months.as_object().into_iter().flatten() {
                for (day, flag) in days.as_object().into_iter().flatten() {
                    if flag.as_str() != Some(NON_WORKING) {
                        continue;
                    }
                    match DayMarker::from_keys(day, month) {
                        Ok(marker) => {
                            markers.insert(marker);
                        }
                        Err(err) => {
                            tracing::debug!(%day, %month, error = %err, "skipping exclusion key");
                        }
                    }
                }
            }
        }
        markers
    }

    /// The first shift record, parsed.
    ///
    /// `None` when there is no shift record at all. A record that is present
    /// but malformed yields `Some(Err(_))`; whether that is fatal is up to the
    /// caller.
    pub fn shift(&self) -> Option<Result<ShiftSettings, CalendarError>> {
        let record = self.shifts.as_array()?.first()?;
        Some(parse_shift_record(record))
    }
}

fn parse_shift_record(record: &Value) -> Result<ShiftSettings, CalendarError> {
    let record = record
        .as_object()
        .ok_or_else(|| CalendarError::InvalidShift("shift record is not an object".to_string()))?;

    let work_days = record
        .get("WORK_DAYS")
        .and_then(Value::as_str)
        .ok_or_else(|| CalendarError::InvalidShift("missing WORK_DAYS string".to_string()))?
        .parse::<WorkDays>()?;
    let start = seconds_field(record, "WORK_TIME_START")?;
    let end = seconds_field(record, "WORK_TIME_END")?;

    Ok(ShiftSettings {
        work_days,
        shift: Shift::from_seconds(start, end)?,
    })
}

/// A JSON number holding whole seconds, e.g. `32400` or `32400.0`.
fn seconds_field(record: &Map<String, Value>, key: &str) -> Result<i64, CalendarError> {
    let value = record
        .get(key)
        .ok_or_else(|| CalendarError::InvalidShift(format!("missing {key}")))?;

    if let Some(seconds) = value.as_i64() {
        return Ok(seconds);
    }
    match value.as_f64() {
        Some(seconds) if seconds.fract() == 0.0 && seconds.abs() < i64::MAX as f64 => {
            Ok(seconds as i64)
        }
        _ => Err(CalendarError::InvalidShift(format!(
            "{key} must be a whole number of seconds, got {value}"
        ))),
    }
}

impl WorkCalendar {
    /// Build a calendar from schedule data, failing on a malformed shift.
    ///
    /// Extra exclusions are added to the default holidays. Without a shift
    /// record the default work days and shift are kept.
    ///
    /// # Errors
    ///
    /// Returns the parse error of a shift record that is present but
    /// malformed.
    pub fn from_config(config: &ScheduleConfig) -> Result<Self, CalendarError> {
        let calendar = Self::default().with_exclusions(config.extra_exclusions());
        match config.shift() {
            Some(settings) => Ok(calendar.with_settings(settings?)),
            None => Ok(calendar),
        }
    }

    /// Build a calendar from schedule data on a best-effort basis.
    ///
    /// Like [`from_config`](WorkCalendar::from_config), but a malformed shift
    /// record is logged and the default work days and shift are kept.
    pub fn from_config_lenient(config: &ScheduleConfig) -> Self {
        let calendar = Self::default().with_exclusions(config.extra_exclusions());
        match config.shift() {
            Some(Ok(settings)) => calendar.with_settings(settings),
            Some(Err(err)) => {
                tracing::warn!(
                    error = %err,
                    "ignoring malformed shift record, keeping default shift"
                );
                calendar
            }
            None => calendar,
        }
    }

    fn with_settings(self, settings: ShiftSettings) -> Self {
        self.with_work_days(settings.work_days).with_shift(settings.shift)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn config(value: Value) -> ScheduleConfig {
        serde_json::from_value(value).unwrap()
    }

    fn markers(set: &BTreeSet<DayMarker>) -> Vec<String> {
        set.iter().map(|m| m.to_string()).collect()
    }

    #[test]
    fn test_extra_exclusions_from_nested_tree() {
        let cfg = config(json!({
            "EXCLUSIONS": {
                "EXCLUSIONS": {
                    "2024": {
                        "01": { "3": "0", "4": "1" },
                        "12": { "31": "0" }
                    },
                    "extra": {
                        "05": { "10": "0" }
                    }
                }
            }
        }));
        assert_eq!(markers(&cfg.extra_exclusions()), vec!["03.01", "10.05", "31.12"]);
    }

    #[test]
    fn test_only_string_zero_marks_non_working() {
        let cfg = config(json!({
            "EXCLUSIONS": { "EXCLUSIONS": { "g": { "03": {
                "1": 0, "2": "00", "3": null, "4": "0"
            } } } }
        }));
        assert_eq!(markers(&cfg.extra_exclusions()), vec!["04.03"]);
    }

    #[test]
    fn test_invalid_keys_are_skipped() {
        let cfg = config(json!({
            "EXCLUSIONS": { "EXCLUSIONS": { "g": {
                "02": { "30": "0", "x": "0", "28": "0" },
                "13": { "1": "0" }
            } } }
        }));
        assert_eq!(markers(&cfg.extra_exclusions()), vec!["28.02"]);
    }

    #[test]
    fn test_missing_or_empty_exclusions_are_empty() {
        assert!(config(json!({})).extra_exclusions().is_empty());
        assert!(config(json!({ "EXCLUSIONS": [] })).extra_exclusions().is_empty());
        assert!(config(json!({ "EXCLUSIONS": { "EXCLUSIONS": [] } }))
            .extra_exclusions()
            .is_empty());
        assert!(config(json!({ "EXCLUSIONS": { "EXCLUSIONS": { "2024": [] } } }))
            .extra_exclusions()
            .is_empty());
    }

    #[test]
    fn test_non_object_levels_are_skipped_not_fatal() {
        let cfg = config(json!({
            "EXCLUSIONS": { "EXCLUSIONS": {
                "broken": "x",
                "2023": { "05": [], "06": { "12": "0" } },
                "2024": { "01": { "3": "0" } }
            } }
        }));
        assert_eq!(markers(&cfg.extra_exclusions()), vec!["03.01", "12.06"]);
        assert!(config(json!({ "EXCLUSIONS": "none" })).extra_exclusions().is_empty());
    }

    #[test]
    fn test_shift_absent() {
        assert!(config(json!({})).shift().is_none());
        assert!(config(json!({ "SHIFTS": [] })).shift().is_none());
        assert!(config(json!({ "SHIFTS": {} })).shift().is_none());
    }

    #[test]
    fn test_shift_uses_first_record() {
        let cfg = config(json!({
            "SHIFTS": [
                { "WORK_DAYS": "123456", "WORK_TIME_START": 28800, "WORK_TIME_END": 61200 },
                { "WORK_DAYS": "12345", "WORK_TIME_START": 0, "WORK_TIME_END": 3600 }
            ]
        }));
        let settings = cfg.shift().unwrap().unwrap();
        assert_eq!(settings.work_days.to_string(), "123456");
        assert_eq!(settings.shift.start(), Duration::hours(8));
        assert_eq!(settings.shift.end(), Duration::hours(17));
    }

    #[test]
    fn test_shift_accepts_whole_float_seconds() {
        let cfg = config(json!({
            "SHIFTS": [{ "WORK_DAYS": "12345", "WORK_TIME_START": 32400.0, "WORK_TIME_END": 64800 }]
        }));
        assert_eq!(cfg.shift().unwrap().unwrap().shift, Shift::DEFAULT);
    }

    #[test]
    fn test_shift_malformed_records() {
        let cases = [
            json!({ "SHIFTS": ["nope"] }),
            json!({ "SHIFTS": [{ "WORK_TIME_START": 32400, "WORK_TIME_END": 64800 }] }),
            json!({ "SHIFTS": [{ "WORK_DAYS": 12345, "WORK_TIME_START": 32400, "WORK_TIME_END": 64800 }] }),
            json!({ "SHIFTS": [{ "WORK_DAYS": "12345", "WORK_TIME_START": "32400", "WORK_TIME_END": 64800 }] }),
            json!({ "SHIFTS": [{ "WORK_DAYS": "12345", "WORK_TIME_START": 32400.5, "WORK_TIME_END": 64800 }] }),
            json!({ "SHIFTS": [{ "WORK_DAYS": "12345", "WORK_TIME_START": 64800, "WORK_TIME_END": 32400 }] }),
            json!({ "SHIFTS": [{ "WORK_DAYS": "1x", "WORK_TIME_START": 32400, "WORK_TIME_END": 64800 }] }),
            json!({ "SHIFTS": [{ "WORK_DAYS": "12345", "WORK_TIME_START": 32400 }] }),
        ];
        for case in cases {
            let cfg = config(case.clone());
            assert!(matches!(cfg.shift(), Some(Err(_))), "expected error for {case}");
        }
    }

    #[test]
    fn test_from_config_adds_to_default_holidays() {
        let cfg = config(json!({
            "EXCLUSIONS": { "EXCLUSIONS": { "2024": { "01": { "3": "0" } } } }
        }));
        let cal = WorkCalendar::from_config(&cfg).unwrap();
        assert_eq!(cal.exclusions().len(), 10);
        assert!(cal.exclusions().contains(&"01.01".parse().unwrap()));
        assert!(cal.exclusions().contains(&"03.01".parse().unwrap()));
        assert_eq!(cal.shift(), Shift::DEFAULT);
        assert_eq!(cal.work_days(), WorkDays::WEEKDAYS);
    }

    #[test]
    fn test_from_config_applies_shift() {
        let cfg = config(json!({
            "SHIFTS": [{ "WORK_DAYS": "123456", "WORK_TIME_START": 28800, "WORK_TIME_END": 61200 }]
        }));
        let cal = WorkCalendar::from_config(&cfg).unwrap();
        assert_eq!(cal.work_days().to_string(), "123456");
        assert_eq!(cal.shift_duration(), Duration::hours(9));
        assert_eq!(cal.shift_start(), Duration::hours(8));
    }

    #[test]
    fn test_from_config_surfaces_malformed_shift() {
        let cfg = config(json!({
            "SHIFTS": [{ "WORK_DAYS": "12345", "WORK_TIME_START": 64800, "WORK_TIME_END": 32400 }]
        }));
        let err = WorkCalendar::from_config(&cfg).unwrap_err();
        assert!(matches!(err, CalendarError::InvalidShift(_)), "got: {err}");
    }

    #[test]
    fn test_from_config_lenient_falls_back_to_defaults() {
        let cfg = config(json!({
            "EXCLUSIONS": { "EXCLUSIONS": { "2024": { "01": { "3": "0" } } } },
            "SHIFTS": [{ "WORK_DAYS": "1x", "WORK_TIME_START": 28800, "WORK_TIME_END": 61200 }]
        }));
        let cal = WorkCalendar::from_config_lenient(&cfg);
        assert_eq!(cal.shift(), Shift::DEFAULT);
        assert_eq!(cal.work_days(), WorkDays::WEEKDAYS);
        assert!(cal.exclusions().contains(&"03.01".parse().unwrap()));
    }

    #[test]
    fn test_from_json() {
        let cfg = ScheduleConfig::from_json(
            r#"{"SHIFTS":[{"WORK_DAYS":"12345","WORK_TIME_START":36000,"WORK_TIME_END":68400}]}"#,
        )
        .unwrap();
        let cal = WorkCalendar::from_config_lenient(&cfg);
        assert_eq!(cal.shift_start(), Duration::hours(10));
        assert!(ScheduleConfig::from_json("42").is_err());
    }
}
