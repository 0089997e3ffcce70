//! # Error Types
//!
//! Custom error types for Joybus Pad using `thiserror`.

use thiserror::Error;

/// Main error type for Joybus Pad
#[derive(Debug, Error)]
pub enum JoybusPadError {
    /// Serial transport errors
    #[error("Serial error: {0}")]
    Serial(String),

    /// No joybus adapter found on any candidate device path
    #[error("No joybus adapter found, tried: {0}")]
    SerialPortNotFound(String),

    /// Axis calibration parameter errors
    #[error("Calibration error: {0}")]
    Calibration(#[from] crate::controller::axis::AxisError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Telemetry record serialization errors
    #[error("Telemetry error: {0}")]
    Telemetry(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Joybus Pad
pub type Result<T> = std::result::Result<T, JoybusPadError>;
