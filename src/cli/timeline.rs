use std::{fmt::Display, path::Path};

use anyhow::Result;
use chrono::{DateTime, Local, NaiveDate, TimeZone};
use chrono_english::parse_date_string;
use clap::{CommandFactory, Parser, ValueEnum};

use crate::{
    provider::heartbeats::HeartbeatAggregateProvider,
    storage::heartbeat_storage::HeartbeatStorageImpl,
    timeline::TimelineEngine,
    utils::clock::Clock,
};

use super::{
    output::{chart::render_chart, table::render_table},
    Args, RECORDS_DIR,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Chart,
    Table,
    Json,
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Chart => write!(f, "chart"),
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Parser)]
pub struct TimelineCommand {
    #[arg(
        long,
        short,
        help = "Day to display. Examples are \"yesterday\", \"15/03/2025\", \"last friday\". Defaults to today"
    )]
    day: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
    #[arg(long, short, default_value_t = OutputFormat::Chart, help = "How to print the timeline")]
    format: OutputFormat,
}

/// Command to process `timeline` command. Prints the stacked ten-minute timeline of a single day.
pub async fn process_timeline_command(
    TimelineCommand {
        day,
        date_style,
        format,
    }: TimelineCommand,
    app_dir: &Path,
    clock: &dyn Clock,
) -> Result<()> {
    let now = clock.time().with_timezone(&Local);
    let day = parse_day(day.as_deref(), date_style, now)?;

    let storage = HeartbeatStorageImpl::new(app_dir.join(RECORDS_DIR))?;
    let engine = TimelineEngine::new(HeartbeatAggregateProvider::new(storage, Local), Local);
    let series = engine.get_timeline(day).await?;

    match format {
        OutputFormat::Chart => print!("{}", render_chart(&series)?),
        OutputFormat::Table => print!("{}", render_table(&series)?),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&series)?),
    }
    Ok(())
}

/// Resolves a user supplied day relative to `now`. No input means the day of `now`.
pub fn parse_day<Tz: TimeZone>(
    day: Option<&str>,
    date_style: DateStyle,
    now: DateTime<Tz>,
) -> Result<NaiveDate>
where
    Tz::Offset: Copy,
{
    let Some(day) = day else {
        return Ok(now.date_naive());
    };
    match parse_date_string(day, now, date_style.into()) {
        Ok(v) => Ok(v.date_naive()),
        Err(e) => Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                format!("Failed to validate day {e}"),
            )
            .into()),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use super::{parse_day, DateStyle};

    #[test]
    fn days_are_parsed_relative_to_now() {
        let now = Utc.with_ymd_and_hms(2024, 4, 5, 12, 30, 0).unwrap();

        assert_eq!(
            parse_day(None, DateStyle::Uk, now).unwrap(),
            NaiveDate::from_ymd_opt(2024, 4, 5).unwrap()
        );
        assert_eq!(
            parse_day(Some("yesterday"), DateStyle::Uk, now).unwrap(),
            NaiveDate::from_ymd_opt(2024, 4, 4).unwrap()
        );
        assert_eq!(
            parse_day(Some("03/04/2024"), DateStyle::Uk, now).unwrap(),
            NaiveDate::from_ymd_opt(2024, 4, 3).unwrap()
        );
        assert_eq!(
            parse_day(Some("03/04/2024"), DateStyle::Us, now).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
        );
        assert!(parse_day(Some("not a date at all"), DateStyle::Uk, now).is_err());
    }
}
