//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::controller::axis::{CenteredParams, LinearParams};
use crate::controller::gamecube::GameCubeParams;
use crate::controller::n64::N64Params;
use crate::controller::poller::PollTiming;
use crate::error::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub serial: SerialConfig,
    pub poll: PollConfig,
    pub controller: ControllerConfig,
    #[serde(default)]
    pub calibration: CalibrationConfig,
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Serial port configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SerialConfig {
    /// Adapter device path; empty means auto-detect
    #[serde(default)]
    pub port: String,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
}

/// Poll cycle configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PollConfig {
    #[serde(default = "default_period_ms")]
    pub period_ms: u64,

    /// Request-to-read delay; unset means the family default
    #[serde(default)]
    pub response_delay_ms: Option<u64>,

    #[serde(default = "default_link_down_threshold")]
    pub link_down_threshold: u32,
}

/// Controller configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ControllerConfig {
    #[serde(default = "default_family")]
    pub family: String,
}

/// Per-axis calibration overrides
///
/// Axes left unset use the family's factory-typical parameters.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct CalibrationConfig {
    #[serde(default)]
    pub stick_x: Option<CenteredAxisConfig>,

    #[serde(default)]
    pub stick_y: Option<CenteredAxisConfig>,

    #[serde(default)]
    pub c_stick_x: Option<CenteredAxisConfig>,

    #[serde(default)]
    pub c_stick_y: Option<CenteredAxisConfig>,

    #[serde(default)]
    pub trigger_left: Option<LinearAxisConfig>,

    #[serde(default)]
    pub trigger_right: Option<LinearAxisConfig>,
}

/// Calibration entry for a centered axis
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct CenteredAxisConfig {
    pub min: i8,
    pub max: i8,
    pub center: i8,
    pub deadzone: u8,
}

impl CenteredAxisConfig {
    /// Convert into axis parameters
    #[must_use]
    pub fn params(&self) -> CenteredParams {
        CenteredParams {
            min: self.min,
            max: self.max,
            center: self.center,
            deadzone: self.deadzone,
        }
    }
}

/// Calibration entry for a linear axis
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct LinearAxisConfig {
    pub min: u8,
    pub max: u8,
    pub deadzone: u8,
}

impl LinearAxisConfig {
    /// Convert into axis parameters
    #[must_use]
    pub fn params(&self) -> LinearParams {
        LinearParams {
            min: self.min,
            max: self.max,
            deadzone: self.deadzone,
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    #[serde(default = "default_telemetry_enabled")]
    pub enabled: bool,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_max_records_per_file")]
    pub max_records_per_file: usize,

    #[serde(default = "default_max_files_to_keep")]
    pub max_files_to_keep: usize,

    #[serde(default = "default_log_interval_ms")]
    pub log_interval_ms: u64,

    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Process log configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct LogConfig {
    /// Directory for daily log files; empty logs to stderr only
    #[serde(default)]
    pub dir: String,
}

// Default value functions
fn default_baud_rate() -> u32 { 1_250_000 }
fn default_read_timeout_ms() -> u64 { 5 }

fn default_period_ms() -> u64 { 15 }
fn default_link_down_threshold() -> u32 { 5 }

fn default_family() -> String { "gamecube".to_string() }

fn default_telemetry_enabled() -> bool { true }
fn default_log_dir() -> String { "./logs".to_string() }
fn default_max_records_per_file() -> usize { 10000 }
fn default_max_files_to_keep() -> usize { 10 }
fn default_log_interval_ms() -> u64 { 1000 }
fn default_log_format() -> String { "jsonl".to_string() }

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use joybus_pad::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Built-in defaults, for running without a configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Configuration with every field at its default
    ///
    /// # Errors
    ///
    /// Never fails in practice; the defaults are valid.
    pub fn load_defaults() -> Result<Self> {
        let config: Config = toml::from_str(
            "[serial]\n[poll]\n[controller]\n[telemetry]\n",
        )?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Returns
    ///
    /// * `Result<()>` - Ok if valid, Err if invalid
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    fn validate(&self) -> Result<()> {
        // Serial port may be empty (auto-detect), but the baud rate must
        // be one the adapter firmware supports
        if ![115_200, 230_400, 460_800, 921_600, 1_000_000, 1_250_000, 2_000_000]
            .contains(&self.serial.baud_rate)
        {
            return Err(crate::error::JoybusPadError::Config(toml::de::Error::custom(
                "baud_rate must be one of: 115200, 230400, 460800, 921600, 1000000, 1250000, 2000000",
            )));
        }

        if self.serial.read_timeout_ms == 0 || self.serial.read_timeout_ms > 1000 {
            return Err(crate::error::JoybusPadError::Config(toml::de::Error::custom(
                "read_timeout_ms must be between 1 and 1000",
            )));
        }

        // Validate poll timing
        if self.poll.period_ms == 0 || self.poll.period_ms > 1000 {
            return Err(crate::error::JoybusPadError::Config(toml::de::Error::custom(
                "period_ms must be between 1 and 1000",
            )));
        }

        if let Some(delay) = self.poll.response_delay_ms {
            if delay > self.poll.period_ms {
                return Err(crate::error::JoybusPadError::Config(toml::de::Error::custom(
                    "response_delay_ms must not exceed period_ms",
                )));
            }
        }

        if self.poll.link_down_threshold == 0 || self.poll.link_down_threshold > 1000 {
            return Err(crate::error::JoybusPadError::Config(toml::de::Error::custom(
                "link_down_threshold must be between 1 and 1000",
            )));
        }

        // Validate controller family
        if !["gamecube", "n64"].contains(&self.controller.family.as_str()) {
            return Err(crate::error::JoybusPadError::Config(toml::de::Error::custom(
                format!(
                    "unknown controller family '{}' (must be 'gamecube' or 'n64')",
                    self.controller.family
                ),
            )));
        }

        // Validate calibration overrides
        for (name, axis) in [
            ("stick_x", &self.calibration.stick_x),
            ("stick_y", &self.calibration.stick_y),
            ("c_stick_x", &self.calibration.c_stick_x),
            ("c_stick_y", &self.calibration.c_stick_y),
        ] {
            if let Some(axis) = axis {
                if axis.min > axis.max {
                    return Err(crate::error::JoybusPadError::Config(toml::de::Error::custom(
                        format!("calibration.{}: min must not exceed max", name),
                    )));
                }
                if axis.center < axis.min || axis.center > axis.max {
                    return Err(crate::error::JoybusPadError::Config(toml::de::Error::custom(
                        format!("calibration.{}: center must be within min..=max", name),
                    )));
                }
            }
        }

        for (name, axis) in [
            ("trigger_left", &self.calibration.trigger_left),
            ("trigger_right", &self.calibration.trigger_right),
        ] {
            if let Some(axis) = axis {
                if axis.min > axis.max {
                    return Err(crate::error::JoybusPadError::Config(toml::de::Error::custom(
                        format!("calibration.{}: min must not exceed max", name),
                    )));
                }
            }
        }

        // Validate telemetry configuration
        if self.telemetry.enabled && self.telemetry.log_dir.is_empty() {
            return Err(crate::error::JoybusPadError::Config(toml::de::Error::custom(
                "telemetry log_dir cannot be empty when enabled",
            )));
        }

        if self.telemetry.log_interval_ms == 0 || self.telemetry.log_interval_ms > 60000 {
            return Err(crate::error::JoybusPadError::Config(toml::de::Error::custom(
                "log_interval_ms must be between 1 and 60000",
            )));
        }

        if self.telemetry.max_records_per_file == 0 {
            return Err(crate::error::JoybusPadError::Config(toml::de::Error::custom(
                "max_records_per_file must be greater than 0",
            )));
        }

        if self.telemetry.max_files_to_keep == 0 {
            return Err(crate::error::JoybusPadError::Config(toml::de::Error::custom(
                "max_files_to_keep must be greater than 0",
            )));
        }

        // Validate log format
        if self.telemetry.format != "jsonl" {
            return Err(crate::error::JoybusPadError::Config(toml::de::Error::custom(
                "log format must be 'jsonl' (only supported format)",
            )));
        }

        Ok(())
    }

    /// Poll timing from the config, with family-default response delays
    ///
    /// # Returns
    ///
    /// * `PollTiming` - Period from `poll.period_ms`; response delay from
    ///   `poll.response_delay_ms`, falling back to the family preset
    #[must_use]
    pub fn poll_timing(&self) -> PollTiming {
        let family_default = if self.controller.family == "n64" {
            PollTiming::n64().response_delay
        } else {
            PollTiming::gamecube().response_delay
        };

        let response_delay = self
            .poll
            .response_delay_ms
            .map(Duration::from_millis)
            .unwrap_or(family_default);

        PollTiming::new(Duration::from_millis(self.poll.period_ms), response_delay)
    }

    /// GameCube axis parameters, config overrides over factory defaults
    #[must_use]
    pub fn gamecube_params(&self) -> GameCubeParams {
        let mut params = GameCubeParams::default();
        if let Some(axis) = &self.calibration.stick_x {
            params.stick_x = axis.params();
        }
        if let Some(axis) = &self.calibration.stick_y {
            params.stick_y = axis.params();
        }
        if let Some(axis) = &self.calibration.c_stick_x {
            params.c_stick_x = axis.params();
        }
        if let Some(axis) = &self.calibration.c_stick_y {
            params.c_stick_y = axis.params();
        }
        if let Some(axis) = &self.calibration.trigger_left {
            params.trigger_l = axis.params();
        }
        if let Some(axis) = &self.calibration.trigger_right {
            params.trigger_r = axis.params();
        }
        params
    }

    /// N64 axis parameters, config overrides over factory defaults
    ///
    /// Only the stick entries apply; the N64 pad has no second stick or
    /// analog triggers to calibrate.
    #[must_use]
    pub fn n64_params(&self) -> N64Params {
        let mut params = N64Params::default();
        if let Some(axis) = &self.calibration.stick_x {
            params.stick_x = axis.params();
        }
        if let Some(axis) = &self.calibration.stick_y {
            params.stick_y = axis.params();
        }
        params
    }
}
