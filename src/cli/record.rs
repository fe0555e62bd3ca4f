use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Local, TimeZone, Utc};
use chrono_english::parse_date_string;
use clap::{CommandFactory, Parser};
use tracing::info;

use crate::{
    storage::{
        entities::{CategoryEntity, HeartbeatEntity, UNCATEGORIZED_COLOR},
        heartbeat_storage::{HeartbeatStorage, HeartbeatStorageImpl},
    },
    utils::clock::Clock,
};

use super::{timeline::DateStyle, Args, RECORDS_DIR};

#[derive(Debug, Parser)]
pub struct RecordCommand {
    #[arg(long, help = "Start of the activity. Examples are \"10 minutes ago\", \"12:00 16/03/2025\"")]
    start: String,
    #[arg(long, help = "End of the activity. Defaults to now")]
    end: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
    #[arg(long, default_value = "", help = "Title of the window")]
    window: String,
    #[arg(long, default_value = "", help = "Path to the executable")]
    process: String,
    #[arg(long, help = "Category of the window")]
    category: Option<String>,
    #[arg(long, requires = "category", help = "Color of the window category, like #ff8000")]
    color: Option<String>,
    #[arg(long, help = "Category of the process, used when the window has none")]
    process_category: Option<String>,
    #[arg(long, requires = "process_category", help = "Color of the process category")]
    process_color: Option<String>,
    #[arg(long, help = "Mark the activity as idle time")]
    idle: bool,
}

/// Appends a single heartbeat into the record file of its start day.
pub async fn process_record_command(
    command: RecordCommand,
    app_dir: &Path,
    clock: &dyn Clock,
) -> Result<()> {
    let heartbeat = build_heartbeat(command, clock.time().with_timezone(&Local))?;
    let storage = HeartbeatStorageImpl::new(app_dir.join(RECORDS_DIR))?;
    storage
        .append(heartbeat.start.date_naive(), vec![heartbeat.clone()])
        .await?;
    info!("Recorded {heartbeat:?}");
    Ok(())
}

fn build_heartbeat<Tz: TimeZone>(
    RecordCommand {
        start,
        end,
        date_style,
        window,
        process,
        category,
        color,
        process_category,
        process_color,
        idle,
    }: RecordCommand,
    now: DateTime<Tz>,
) -> Result<HeartbeatEntity>
where
    Tz::Offset: Copy,
{
    let start = parse_moment(&start, date_style, now.clone())?;
    let end = match end {
        Some(end) => parse_moment(&end, date_style, now.clone())?,
        None => now.to_utc(),
    };
    if end < start {
        return Err(validation_error(format!(
            "Activity can't end ({end}) before it starts ({start})"
        )));
    }

    let category_entity = |name: Option<String>, color: Option<String>| {
        name.map(|name| {
            CategoryEntity::new(name, color.unwrap_or_else(|| UNCATEGORIZED_COLOR.into()))
        })
    };

    Ok(HeartbeatEntity {
        window_name: window.into(),
        process_name: process.into(),
        start,
        end,
        idle,
        window_category: category_entity(category, color),
        process_category: category_entity(process_category, process_color),
    })
}

fn parse_moment<Tz: TimeZone>(
    value: &str,
    date_style: DateStyle,
    now: DateTime<Tz>,
) -> Result<DateTime<Utc>>
where
    Tz::Offset: Copy,
{
    parse_date_string(value, now, date_style.into())
        .map(|v| v.to_utc())
        .map_err(|e| validation_error(format!("Failed to validate date {value:?} {e}")))
}

fn validation_error(message: String) -> anyhow::Error {
    Args::command()
        .error(clap::error::ErrorKind::ValueValidation, message)
        .into()
}
