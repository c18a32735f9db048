//! workcal - query a business work calendar
//!
//! Checks working time and does working-duration arithmetic against the
//! default calendar or one adapted from an HR-system schedule export.

use std::path::PathBuf;

use anyhow::{bail, Result};
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use work_calendar::WorkCalendar;

mod provider;

use provider::{load_calendar, CalendarConfigProvider, DefaultProvider, JsonFileProvider};

const OUTPUT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const INPUT_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// workcal - query a business work calendar
#[derive(Parser, Debug)]
#[command(name = "workcal")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Schedule JSON exported from the HR system (defaults apply when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fail on a malformed shift record instead of keeping the default shift
    #[arg(long)]
    strict: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the calendar rules
    Show,

    /// Check whether a timestamp is working time
    IsWorking {
        /// Naive timestamp, e.g. 2024-01-02T09:00:00
        timestamp: String,
    },

    /// Snap a timestamp onto working time
    Nearest {
        /// Naive timestamp, e.g. 2024-01-02T09:00:00
        timestamp: String,
    },

    /// Add working seconds to a timestamp
    Add {
        /// Naive timestamp, e.g. 2024-01-02T09:00:00
        timestamp: String,

        /// Working seconds to add
        #[arg(allow_hyphen_values = true)]
        seconds: i64,
    },

    /// Working time between two timestamps
    Duration {
        /// Start timestamp (inclusive)
        start: String,

        /// End timestamp (exclusive)
        end: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let provider: Box<dyn CalendarConfigProvider> = match &cli.config {
        Some(path) => Box::new(JsonFileProvider::new(path)),
        None => Box::new(DefaultProvider),
    };
    let calendar = load_calendar(provider.as_ref(), cli.strict)?;

    let output = run(&calendar, &cli.command)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn run(calendar: &WorkCalendar, command: &Commands) -> Result<serde_json::Value> {
    let output = match command {
        Commands::Show => serde_json::to_value(calendar)?,
        Commands::IsWorking { timestamp } => {
            let t = parse_timestamp(timestamp)?;
            json!({
                "timestamp": format_timestamp(t),
                "working": calendar.is_working_time(t),
            })
        }
        Commands::Nearest { timestamp } => {
            let t = parse_timestamp(timestamp)?;
            json!({
                "timestamp": format_timestamp(t),
                "nearest": format_timestamp(calendar.nearest_working_instant(t)?),
            })
        }
        Commands::Add { timestamp, seconds } => {
            let t = parse_timestamp(timestamp)?;
            json!({
                "start": format_timestamp(t),
                "seconds": seconds,
                "end": format_timestamp(calendar.add_seconds(t, *seconds)?),
            })
        }
        Commands::Duration { start, end } => {
            let start = parse_timestamp(start)?;
            let end = parse_timestamp(end)?;
            let duration = calendar.get_duration(start, end);
            json!({
                "start": format_timestamp(start),
                "end": format_timestamp(end),
                "seconds": duration.num_seconds(),
                "minutes": duration.num_minutes(),
            })
        }
    };
    Ok(output)
}

fn parse_timestamp(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();
    for format in INPUT_FORMATS {
        if let Ok(t) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(t);
        }
    }
    bail!("invalid timestamp '{s}': expected YYYY-MM-DDTHH:MM[:SS]")
}

fn format_timestamp(t: NaiveDateTime) -> String {
    t.format(OUTPUT_FORMAT).to_string()
}
