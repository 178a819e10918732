//! Logging to the console and to a log file in the output folder.
//!
//! Messages about individual simulated hours are logged under their own target,
//! [`HOURLY_TARGET`]. A run over a few months produces thousands of them, so they are dropped
//! unless the `log_hourly` setting is enabled, whatever the log level.
use crate::settings::Settings;
use anyhow::{Context, Result, anyhow};
use chrono::Local;
use fern::Dispatch;
use fern::colors::{Color, ColoredLevelConfig};
use log::{Level, LevelFilter};
use std::env;
use std::fs::File;
use std::io::IsTerminal;
use std::path::Path;
use std::str::FromStr;
use std::sync::OnceLock;

/// A flag indicating whether the logger has been initialised
static LOGGER_INIT: OnceLock<()> = OnceLock::new();

/// The log level used if neither the settings file nor the environment specify one
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// The environment variable which overrides the log level from the settings file
pub const LOG_LEVEL_ENV_VAR: &str = "H2SIM_LOG_LEVEL";

/// The log target for per-hour simulation messages
pub const HOURLY_TARGET: &str = "h2sim::hourly";

/// The name of the log file written to the output folder
pub const LOG_FILE_NAME: &str = "h2sim.log";

/// Whether the program logger has been initialised
pub fn is_logger_initialised() -> bool {
    LOGGER_INIT.get().is_some()
}

/// Which messages the logger lets through
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogConfig {
    /// The most verbose level shown on the console
    pub level: LevelFilter,
    /// Whether per-hour simulation messages are shown
    pub hourly: bool,
}

impl LogConfig {
    /// Take the log configuration from the settings.
    ///
    /// The `H2SIM_LOG_LEVEL` environment variable takes precedence over the settings file.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let level = env::var(LOG_LEVEL_ENV_VAR).unwrap_or_else(|_| settings.log_level.clone());

        Ok(Self {
            level: parse_level(&level)?,
            hourly: settings.log_hourly,
        })
    }

    /// The level for messages under [`HOURLY_TARGET`]
    fn hourly_level(self, level: LevelFilter) -> LevelFilter {
        if self.hourly {
            level
        } else {
            LevelFilter::Off
        }
    }

    /// The level for the log file, which always records at least `info` messages
    fn file_level(self) -> LevelFilter {
        self.level.max(LevelFilter::Info)
    }
}

/// Parse a log level name (e.g. `warn`), ignoring case
fn parse_level(level: &str) -> Result<LevelFilter> {
    LevelFilter::from_str(level.trim()).map_err(|_| anyhow!("Unknown log level: {level}"))
}

/// Colours for each log level on the console
fn level_colours() -> ColoredLevelConfig {
    ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Blue)
        .trace(Color::Magenta)
}

/// A console logger showing just the level and message
fn console(use_colour: bool) -> Dispatch {
    let colours = level_colours();
    Dispatch::new().format(move |out, message, record| {
        if use_colour {
            out.finish(format_args!("[{}] {message}", colours.color(record.level())));
        } else {
            out.finish(format_args!("[{}] {message}", record.level()));
        }
    })
}

/// Initialise the program logger.
///
/// Warnings and errors go to stderr and other messages to stdout. If `output_path` is given, every
/// message is also written with a timestamp and target to [`LOG_FILE_NAME`] in that folder.
pub fn init(config: LogConfig, output_path: Option<&Path>) -> Result<()> {
    let mut dispatch = Dispatch::new()
        .chain(
            console(std::io::stdout().is_terminal())
                .filter(|metadata| metadata.level() > Level::Warn)
                .level(config.level)
                .level_for(HOURLY_TARGET, config.hourly_level(config.level))
                .chain(std::io::stdout()),
        )
        .chain(
            console(std::io::stderr().is_terminal())
                .filter(|metadata| metadata.level() <= Level::Warn)
                .level(config.level)
                .chain(std::io::stderr()),
        );

    if let Some(output_path) = output_path {
        let file_path = output_path.join(LOG_FILE_NAME);
        let file = File::create(&file_path)
            .with_context(|| format!("Could not create log file {}", file_path.display()))?;

        dispatch = dispatch.chain(
            Dispatch::new()
                .format(|out, message, record| {
                    out.finish(format_args!(
                        "{} {:<5} {}: {message}",
                        Local::now().format("%Y-%m-%d %H:%M:%S"),
                        record.level(),
                        record.target()
                    ));
                })
                .level(config.file_level())
                .level_for(HOURLY_TARGET, config.hourly_level(config.file_level()))
                .chain(file),
        );
    }

    dispatch
        .apply()
        .map_err(|_| anyhow!("Logger already initialised"))?;
    LOGGER_INIT
        .set(())
        .map_err(|()| anyhow!("Logger already initialised"))?;

    Ok(())
}
