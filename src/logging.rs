use std::{io::Write, str::FromStr};

use anyhow::{Context, Result};
use env_logger::{fmt::Formatter, Builder, Target};
use log::{Level, LevelFilter};

use crate::config::LogConfig;

/// Install the global logger; `RUST_LOG` takes precedence over the configured level.
pub fn init(config: &LogConfig) -> Result<()> {
    let level = LevelFilter::from_str(&config.level)
        .with_context(|| format!("Invalid log level {:?}", config.level))?;
    let timestamp = config.timestamp;

    let mut builder = Builder::new();
    builder
        .filter_level(level)
        .parse_default_env()
        .target(Target::Stderr)
        .format(move |buf: &mut Formatter, record| {
            if timestamp {
                write!(buf, "{} ", buf.timestamp_millis())?;
            }
            writeln!(buf, "{} {}", level_tag(record.level()), record.args())
        });

    builder.try_init().context("Failed to initialise logger")
}

fn level_tag(level: Level) -> &'static str {
    match level {
        Level::Error => "ERROR",
        Level::Warn => "WARN",
        Level::Info => "INFO",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    }
}
