use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;
use reels_logging::{LogDestination, DEFAULT_LOG_FILE};

#[derive(Parser, Debug)]
#[command(name = "reels")]
#[command(about = "Buffered reel viewer driven over WebDriver", long_about = None)]
#[command(version)]
pub struct Cli {
    /// RON settings file; missing means defaults
    #[arg(long, default_value = "reels.ron")]
    pub settings: PathBuf,

    /// WebDriver endpoint (overrides the settings file)
    #[arg(long)]
    pub webdriver: Option<String>,

    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Where log lines go
    #[arg(long = "log", value_enum, default_value_t = LogTarget::File)]
    pub log_target: LogTarget,

    #[arg(long, default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    /// Write the effective settings to --settings and exit
    #[arg(long)]
    pub write_settings: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    Terminal,
    File,
    Both,
}

impl Cli {
    pub fn log_destination(&self) -> LogDestination {
        match self.log_target {
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::File => LogDestination::File(self.log_file.clone()),
            LogTarget::Both => LogDestination::Both(self.log_file.clone()),
        }
    }
}
