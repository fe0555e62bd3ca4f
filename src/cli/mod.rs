pub mod output;
pub mod record;
pub mod timeline;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use record::{process_record_command, RecordCommand};
use timeline::{process_timeline_command, TimelineCommand};
use tracing::level_filters::LevelFilter;

use crate::utils::{
    clock::DefaultClock,
    dir::{create_application_default_path, ensure_dir},
    logging::{enable_logging, LoggingOptions},
};

/// Directory inside the application directory that holds heartbeat record files.
pub const RECORDS_DIR: &str = "records";

#[derive(Parser, Debug)]
#[command(name = "Daystack", version, long_about = None)]
#[command(about = "Stacked 24 hour timelines of your activity", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, global = true, help = "Print logs into stdout. Logs everything unless --log-filter is set")]
    log: bool,
    #[arg(
        long = "log-filter",
        global = true,
        help = "Level of logs written. Examples are \"warn\", \"info\", \"trace\". Defaults to $RUST_LOG or debug"
    )]
    log_filter: Option<LevelFilter>,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default uses $XDG_STATE_HOME/daystack or $HOME/.local/state/daystack"
    )]
    dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Display a stacked timeline of a single day")]
    Timeline {
        #[command(flatten)]
        command: TimelineCommand,
    },
    #[command(about = "Record a span of activity")]
    Record {
        #[command(flatten)]
        command: RecordCommand,
    },
}

impl Args {
    fn logging_options(&self) -> LoggingOptions {
        LoggingOptions {
            level: self
                .log_filter
                .or(self.log.then_some(LevelFilter::TRACE)),
            stdout: self.log,
        }
    }
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let app_dir = args
        .dir
        .clone()
        .map_or_else(create_application_default_path, ensure_dir)?;

    enable_logging(&app_dir, args.logging_options())?;

    match args.commands {
        Commands::Timeline { command } => {
            process_timeline_command(command, &app_dir, &DefaultClock).await
        }
        Commands::Record { command } => {
            process_record_command(command, &app_dir, &DefaultClock).await
        }
    }
}
