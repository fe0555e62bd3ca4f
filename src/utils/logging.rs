//! Tracing setup for the CLI and for tests.

use std::{path::Path, sync::LazyLock};

use anyhow::Result;
use tracing::level_filters::LevelFilter;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::{
    fmt::{format::FmtSpan, writer::MakeWriterExt},
    EnvFilter,
};

/// Prefix of the daily log files.
pub const LOG_FILE_PREFIX: &str = "daystack";
const LOG_DIR: &str = "logs";
const KEPT_LOG_FILES: usize = 5;
const DEFAULT_LEVEL: &str = "debug";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoggingOptions {
    /// Wins over `RUST_LOG`.
    pub level: Option<LevelFilter>,
    /// Mirror log records into stdout.
    pub stdout: bool,
}

impl LoggingOptions {
    /// Filter directive scoped to this crate. The explicit level wins, then `rust_log`, then `debug`.
    fn directive(&self, rust_log: Option<String>) -> String {
        let level = match (self.level, rust_log) {
            (Some(level), _) => level.to_string(),
            (None, Some(env)) => env,
            (None, None) => DEFAULT_LEVEL.into(),
        };
        format!("{}={level}", env!("CARGO_PKG_NAME").replace('-', "_"))
    }
}

/// Logs into daily rotated files under `<app_dir>/logs`, and into stdout when asked to.
pub fn enable_logging(app_dir: &Path, options: LoggingOptions) -> Result<()> {
    let appender = tracing_appender::rolling::Builder::new()
        .rotation(Rotation::DAILY)
        .max_log_files(KEPT_LOG_FILES)
        .filename_prefix(LOG_FILE_PREFIX)
        .build(app_dir.join(LOG_DIR))?;

    let show_stdout = options.stdout;
    let stdout = std::io::stdout.with_filter(move |_| show_stdout);

    let directive = options.directive(std::env::var("RUST_LOG").ok());

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(directive))
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(stdout.and(appender))
        .pretty()
        .init();
    Ok(())
}

pub static TEST_LOGGING: LazyLock<()> = LazyLock::new(|| {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::TRACE)
        .with_test_writer()
        .pretty()
        .init()
});
