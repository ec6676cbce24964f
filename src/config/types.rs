//! Configuration types and CLI value enums.
//!
//! This module defines the library [`Config`], the connection retry policy,
//! and the enums used for command-line argument parsing.

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;

use crate::config::constants::{
    CONNECT_MAX_ATTEMPTS, CONNECT_RETRY_DELAY, DATASET_URL, DB_PATH, ENV_DATASET_URL, ENV_DB_PATH,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Bounded retry policy for storage connection attempts.
///
/// The delay applies between attempts, never after the last one; the failure
/// of the final attempt is returned to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts before giving up (including the first).
    pub max_attempts: u32,
    /// Fixed delay between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: CONNECT_MAX_ATTEMPTS,
            delay: CONNECT_RETRY_DELAY,
        }
    }
}

/// Library configuration (no CLI dependencies).
///
/// This is the core configuration struct used by the library. It can be
/// constructed programmatically without any CLI dependencies.
///
/// # Examples
///
/// ```no_run
/// use ip_location_updater::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     db_path: PathBuf::from("./ip_locations.db"),
///     dataset_url: "https://example.com/dataset.csv".into(),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Database path (SQLite file)
    pub db_path: PathBuf,

    /// Dataset source URL
    pub dataset_url: String,

    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,

    /// Storage connection retry policy
    pub connect_retry: RetryPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DB_PATH),
            dataset_url: DATASET_URL.to_string(),
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            connect_retry: RetryPolicy::default(),
        }
    }
}

impl Config {
    /// Builds a config from the environment, falling back to defaults.
    ///
    /// Reads `IP_LOCATIONS_DB_PATH` and `IP_LOCATIONS_DATASET_URL`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(path) = std::env::var(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Ok(url) = std::env::var(ENV_DATASET_URL) {
            config.dataset_url = url;
        }
        config
    }
}
