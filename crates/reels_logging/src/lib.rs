#![deny(missing_docs)]
//! Shared logging utilities for the reels workspace.
//!
//! This crate provides the `reels_*` logging macros used across the codebase,
//! the logger initialisation used by the runner, and a minimal test
//! initializer for the global logger.
//!
//! Every macro takes a [`Lane`] as its first argument. The lane becomes the
//! log target, so the interleaved output of the foreground and background
//! sessions can be told apart (and filtered) after the fact.

use std::fs::File;
use std::path::{Path, PathBuf};

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

#[doc(hidden)]
pub use log as __log;

/// Default log file written by [`initialize`] for file destinations.
pub const DEFAULT_LOG_FILE: &str = "./reels.log";

/// Which part of the pipeline a log line comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lane {
    /// The primary session the viewer is watching.
    Foreground,
    /// The secondary session used for buffer collection.
    Background,
    /// Composition root and event delivery.
    Controller,
    /// The automation capability adapter.
    Driver,
}

impl Lane {
    /// Log target used for this lane.
    pub const fn target(self) -> &'static str {
        match self {
            Lane::Foreground => "reels::foreground",
            Lane::Background => "reels::background",
            Lane::Controller => "reels::controller",
            Lane::Driver => "reels::driver",
        }
    }
}

/// Logs a trace-level message on a lane.
#[macro_export]
macro_rules! reels_trace {
    ($lane:expr, $($arg:tt)*) => {{
        $crate::__log::trace!(target: $crate::Lane::target($lane), $($arg)*);
    }};
}

/// Logs a debug-level message on a lane.
#[macro_export]
macro_rules! reels_debug {
    ($lane:expr, $($arg:tt)*) => {{
        $crate::__log::debug!(target: $crate::Lane::target($lane), $($arg)*);
    }};
}

/// Logs an info-level message on a lane.
#[macro_export]
macro_rules! reels_info {
    ($lane:expr, $($arg:tt)*) => {{
        $crate::__log::info!(target: $crate::Lane::target($lane), $($arg)*);
    }};
}

/// Logs a warn-level message on a lane.
#[macro_export]
macro_rules! reels_warn {
    ($lane:expr, $($arg:tt)*) => {{
        $crate::__log::warn!(target: $crate::Lane::target($lane), $($arg)*);
    }};
}

/// Logs an error-level message on a lane.
#[macro_export]
macro_rules! reels_error {
    ($lane:expr, $($arg:tt)*) => {{
        $crate::__log::error!(target: $crate::Lane::target($lane), $($arg)*);
    }};
}

/// Destination for log output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogDestination {
    /// Write to a log file.
    File(PathBuf),
    /// Write to the terminal.
    Terminal,
    /// Write to both a log file and the terminal.
    Both(PathBuf),
}

impl LogDestination {
    /// File destination at [`DEFAULT_LOG_FILE`].
    pub fn default_file() -> Self {
        LogDestination::File(PathBuf::from(DEFAULT_LOG_FILE))
    }
}

/// Initialize the global logger.
///
/// A file that cannot be created is reported on stderr and skipped. If a
/// logger is already installed this keeps the existing one.
pub fn initialize(destination: LogDestination, level: LevelFilter) {
    let config = build_config();

    let loggers: Vec<Box<dyn SharedLogger>> = match destination {
        LogDestination::File(path) => match create_file_logger(&path, level, config) {
            Some(file_logger) => vec![file_logger],
            None => return,
        },
        LogDestination::Terminal => vec![terminal_logger(level, config)],
        LogDestination::Both(path) => {
            let mut loggers = vec![terminal_logger(level, config.clone())];
            if let Some(file_logger) = create_file_logger(&path, level, config) {
                loggers.push(file_logger);
            }
            loggers
        }
    };

    let _ = CombinedLogger::init(loggers);
}

/// Initializes a simple terminal logger for use in tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}

fn terminal_logger(level: LevelFilter, config: Config) -> Box<dyn SharedLogger> {
    TermLogger::new(level, config, TerminalMode::Mixed, ColorChoice::Auto)
}

fn create_file_logger(
    path: &Path,
    level: LevelFilter,
    config: Config,
) -> Option<Box<dyn SharedLogger>> {
    match File::create(path) {
        Ok(file) => Some(WriteLogger::new(level, config, file) as Box<dyn SharedLogger>),
        Err(err) => {
            eprintln!("Warning: could not create log file at {:?}: {}", path, err);
            None
        }
    }
}
