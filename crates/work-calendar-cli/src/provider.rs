//! Sources of raw schedule configuration.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use work_calendar::{ScheduleConfig, WorkCalendar};

/// Supplies already-fetched schedule data to build a calendar from.
pub trait CalendarConfigProvider {
    fn fetch(&self) -> Result<ScheduleConfig>;
}

/// No external data: the built-in defaults apply.
pub struct DefaultProvider;

impl CalendarConfigProvider for DefaultProvider {
    fn fetch(&self) -> Result<ScheduleConfig> {
        Ok(ScheduleConfig::default())
    }
}

/// Schedule data stored as a JSON file.
pub struct JsonFileProvider {
    path: PathBuf,
}

impl JsonFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CalendarConfigProvider for JsonFileProvider {
    fn fetch(&self) -> Result<ScheduleConfig> {
        let text = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        ScheduleConfig::from_json(&text)
            .with_context(|| format!("failed to parse schedule in {}", self.path.display()))
    }
}

/// Fetch and adapt a calendar. In strict mode a malformed shift record is
/// an error; otherwise it is logged and the default shift is kept.
pub fn load_calendar(provider: &dyn CalendarConfigProvider, strict: bool) -> Result<WorkCalendar> {
    let config = provider.fetch()?;
    let calendar = if strict {
        WorkCalendar::from_config(&config).context("invalid shift configuration")?
    } else {
        WorkCalendar::from_config_lenient(&config)
    };
    tracing::debug!(
        exclusions = calendar.exclusions().len(),
        work_days = %calendar.work_days(),
        "calendar loaded"
    );
    Ok(calendar)
}
