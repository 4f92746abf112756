//! Console and file logging built on `fern`.

use chrono::Local;
use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::{fmt, fs, path::Path};
use strum::{Display, EnumString};

pub const DEFAULT_LOGS_DATETIME_FORMAT: &str = "[%Y-%m-%d] (%H:%M:%S%.3f)";

pub fn default_logs_datetime_format() -> String {
    DEFAULT_LOGS_DATETIME_FORMAT.to_owned()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

// Everything the logger needs, decoupled from the CLI config
#[derive(Debug, Clone)]
pub struct LoggerSettings {
    pub level: LogLevel,
    pub file_level: Option<LogLevel>,
    pub file_logging: bool,
    pub date_based_file: bool,
    pub logs_path: String,
    pub filename: String,
    pub colors: bool,
    pub datetime_format: String,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            file_level: None,
            file_logging: false,
            date_based_file: true,
            logs_path: "logs/".to_owned(),
            filename: "banx.log".to_owned(),
            colors: true,
            datetime_format: default_logs_datetime_format(),
        }
    }
}

// Install the global logger. Can only succeed once per process.
pub fn setup_logger(settings: &LoggerSettings) -> Result<(), fern::InitError> {
    let colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Cyan)
        .trace(Color::Magenta);

    let datetime_format = settings.datetime_format.clone();
    let use_colors = settings.colors;
    let console = fern::Dispatch::new()
        .format(move |out, message, record| {
            let level: Box<dyn fmt::Display> = if use_colors {
                Box::new(colors.color(record.level()))
            } else {
                Box::new(record.level())
            };
            out.finish(format_args!(
                "{} {} [{}] {}",
                Local::now().format(&datetime_format),
                level,
                record.target(),
                message
            ))
        })
        .level(settings.level.into())
        .chain(std::io::stdout());

    let mut base = fern::Dispatch::new().chain(console);

    if settings.file_logging {
        fs::create_dir_all(&settings.logs_path)?;

        let datetime_format = settings.datetime_format.clone();
        let file = fern::Dispatch::new()
            .format(move |out, message, record| {
                out.finish(format_args!(
                    "{} {} [{}] {}",
                    Local::now().format(&datetime_format),
                    record.level(),
                    record.target(),
                    message
                ))
            })
            .level(settings.file_level.unwrap_or(settings.level).into());

        let file = if settings.date_based_file {
            file.chain(fern::DateBased::new(
                &settings.logs_path,
                format!("%Y-%m-%d.{}", settings.filename),
            ))
        } else {
            file.chain(fern::log_file(
                Path::new(&settings.logs_path).join(&settings.filename),
            )?)
        };

        base = base.chain(file);
    }

    base.apply()?;
    log_panics::init();

    Ok(())
}
