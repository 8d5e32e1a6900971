use clap::ArgMatches;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::devices::gps::poll_ticks;
use crate::nmea::DEFAULT_MAX_SENTENCE_LENGTH;
use crate::utils::error::GnssError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // Connection settings
    pub serial_port: String,
    pub baud_rate: u32,

    // Acquisition settings
    pub poll_interval_ms: u64,
    pub nmea_timeout_seconds: u64,
    pub loop_time_seconds: u64,
    pub max_sentence_length: usize,

    // Receiver enable line (sysfs GPIO number), None if always powered
    pub power_gpio: Option<u32>,

    // Output settings
    pub output_format: OutputFormat,
    pub output_file: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Console,
    Json,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = GnssError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "console" => Ok(OutputFormat::Console),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(GnssError::ConfigError(format!("Unknown output format: {}", other))),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            serial_port: "/dev/ttyO4".to_string(),
            baud_rate: 9600,

            poll_interval_ms: 250,
            nmea_timeout_seconds: 45,
            loop_time_seconds: 2,
            max_sentence_length: DEFAULT_MAX_SENTENCE_LENGTH,

            power_gpio: None,

            output_format: OutputFormat::Console,
            output_file: None,
        }
    }
}

fn parse_arg<T: std::str::FromStr>(matches: &ArgMatches, name: &str) -> Result<Option<T>, GnssError>
where
    T::Err: std::fmt::Display,
{
    matches
        .get_one::<String>(name)
        .map(|value| {
            value
                .parse::<T>()
                .map_err(|e| GnssError::ConfigError(format!("Invalid --{} '{}': {}", name, value, e)))
        })
        .transpose()
}

impl Config {
    /// Defaults, or the `--config` file, with command line overrides applied.
    pub fn from_matches(matches: &ArgMatches) -> Result<Self, GnssError> {
        let mut config = match matches.get_one::<String>("config") {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(port) = matches.get_one::<String>("port") {
            config.serial_port = port.clone();
        }
        if let Some(baud) = parse_arg(matches, "baud")? {
            config.baud_rate = baud;
        }
        if let Some(timeout) = parse_arg(matches, "timeout")? {
            config.nmea_timeout_seconds = timeout;
        }
        if let Some(interval) = parse_arg(matches, "interval")? {
            config.loop_time_seconds = interval;
        }
        if let Some(gpio) = parse_arg(matches, "power-gpio")? {
            config.power_gpio = Some(gpio);
        }
        if let Some(format) = parse_arg(matches, "format")? {
            config.output_format = format;
        }
        if let Some(output_file) = matches.get_one::<String>("output-file") {
            config.output_file = Some(output_file.clone());
        }

        config.validate()?;
        debug!("Effective configuration: {:?}", config);
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, GnssError> {
        info!("📄 Loading configuration from {}", path.as_ref().display());
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            GnssError::ConfigError(format!("Cannot read {}: {}", path.as_ref().display(), e))
        })?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), GnssError> {
        // Create directory if it doesn't exist
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), GnssError> {
        if self.serial_port.trim().is_empty() {
            return Err(GnssError::ConfigError("serial_port must not be empty".to_string()));
        }
        if self.baud_rate == 0 {
            return Err(GnssError::ConfigError("baud_rate must be positive".to_string()));
        }
        if self.poll_interval_ms == 0 {
            return Err(GnssError::ConfigError("poll_interval_ms must be positive".to_string()));
        }
        if self.nmea_timeout_seconds == 0 {
            return Err(GnssError::ConfigError("nmea_timeout_seconds must be positive".to_string()));
        }
        // Must at least fit a conventional 82 character sentence
        if self.max_sentence_length < 82 {
            return Err(GnssError::ConfigError(format!(
                "max_sentence_length {} is shorter than an NMEA sentence",
                self.max_sentence_length
            )));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn nmea_timeout(&self) -> Duration {
        Duration::from_secs(self.nmea_timeout_seconds)
    }

    pub fn loop_time(&self) -> Duration {
        Duration::from_secs(self.loop_time_seconds)
    }

    /// Polls a reader built from this config makes per attempt.
    pub fn timeout_ticks(&self) -> u64 {
        poll_ticks(self.nmea_timeout(), self.poll_interval())
    }
}
