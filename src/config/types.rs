//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::constants::{DB_PATH, DEFAULT_BIND, DEFAULT_PORT, DEFAULT_RADIUS_KM, DEFAULT_SOURCE};

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

/// Service configuration.
///
/// Parsed from the command line (with environment variable fallbacks), or
/// constructed programmatically for library and test usage.
///
/// # Examples
///
/// ```bash
/// # Serve with defaults
/// zip_geodata
///
/// # Custom database, wider search radius, ingest before serving
/// zip_geodata --db-path ./zips.db --radius-km 80 --populate-on-start
/// ```
#[derive(Debug, Clone, Parser)]
#[command(
    name = "zip_geodata",
    about = "Serves ZIP code metadata and reverse-geocodes coordinates to the nearest ZIP code."
)]
pub struct Config {
    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Database path (SQLite file)
    #[arg(long, env = "ZIP_GEODATA_DB_PATH", default_value = DB_PATH)]
    pub db_path: PathBuf,

    /// Raw ZIP code CSV, as a local path or an http(s) URL
    #[arg(long, env = "ZIP_GEODATA_SOURCE", default_value = DEFAULT_SOURCE)]
    pub source: String,

    /// Address to bind the HTTP server to
    #[arg(long, env = "ZIP_GEODATA_BIND", default_value = DEFAULT_BIND)]
    pub bind: String,

    /// Port to bind the HTTP server to
    #[arg(long, env = "ZIP_GEODATA_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Reverse-geocode search radius in kilometers
    ///
    /// Must be positive. An invalid value is reported on every reverse request
    /// rather than refusing to start, so ZIP lookups keep working.
    #[arg(long, env = "ZIP_GEODATA_RADIUS_KM", default_value_t = DEFAULT_RADIUS_KM, allow_negative_numbers = true)]
    pub radius_km: f64,

    /// Ingest the source CSV before serving requests
    #[arg(long)]
    pub populate_on_start: bool,
}

impl Config {
    /// Returns true if the configured radius can be used for queries.
    pub fn radius_is_valid(&self) -> bool {
        self.radius_km.is_finite() && self.radius_km > 0.0
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            db_path: PathBuf::from(DB_PATH),
            source: DEFAULT_SOURCE.to_string(),
            bind: DEFAULT_BIND.to_string(),
            port: DEFAULT_PORT,
            radius_km: DEFAULT_RADIUS_KM,
            populate_on_start: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Warn),
            log::LevelFilter::Warn
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Info),
            log::LevelFilter::Info
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.port, 8787);
        assert_eq!(config.radius_km, 50.0);
        assert_eq!(config.db_path, PathBuf::from("./zip_geodata.db"));
        assert!(!config.populate_on_start);
        assert!(config.radius_is_valid());
    }

    #[test]
    fn test_config_parse_overrides() {
        let config = Config::try_parse_from([
            "zip_geodata",
            "--port",
            "9000",
            "--radius-km",
            "12.5",
            "--source",
            "https://example.com/zips.csv",
            "--populate-on-start",
        ])
        .expect("valid arguments should parse");
        assert_eq!(config.port, 9000);
        assert_eq!(config.radius_km, 12.5);
        assert_eq!(config.source, "https://example.com/zips.csv");
        assert!(config.populate_on_start);
    }

    #[test]
    fn test_radius_validity() {
        let mut config = Config::default();
        config.radius_km = 0.0;
        assert!(!config.radius_is_valid());
        config.radius_km = -3.0;
        assert!(!config.radius_is_valid());
        config.radius_km = f64::NAN;
        assert!(!config.radius_is_valid());
        config.radius_km = 0.001;
        assert!(config.radius_is_valid());
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let result = Config::try_parse_from(["zip_geodata", "--log-level", "verbose"]);
        assert!(result.is_err());
    }
}
