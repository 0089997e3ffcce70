//! # Joybus Pad
//!
//! Poll GameCube and N64 controllers over a serial joybus adapter.
//!
//! This application drives the poll cycle for one controller, projects the
//! raw frames through calibration, and reports link health and input state
//! through logs and JSONL telemetry.

use anyhow::Result;
use std::path::Path;
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, info, warn};

mod config;
mod controller;
mod error;
mod joybus;
mod serial;
mod telemetry;

use config::Config;
use controller::driver::PadDriver;
use controller::gamecube::{GameCubeCalibration, GameCubePad};
use controller::n64::{N64Calibration, N64Pad};
use joybus::frame::{GameCubeFrame, N64Frame, WireFrame};
use serial::{JoybusSerial, DEFAULT_DEVICE_PATHS};
use telemetry::logger::StatusLogger;
use telemetry::types::StatusRecord;

/// Config file used when no path is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Number of poll ticks between status log messages
///
/// A poll cycle is two ticks (request, then parse), so 4000 ticks is
/// 2000 cycles, about 30 seconds at the default 15ms period.
const LOG_INTERVAL_TICKS: u64 = 4000;

/// Main entry point for the Joybus Pad application
///
/// Initializes the application and runs the poll loop that continuously
/// exchanges poll commands and responses with the controller.
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration (first argument, or `config/default.toml`)
///    - Set up logging with tracing subscriber (stderr, plus a daily log
///      file when `log.dir` is set)
///    - Open the joybus adapter and build the configured pad driver
///
/// 2. **Main Loop**
///    - Step the poll cycle, sleeping exactly as long as the driver asks
///    - Log poll counters every 2000 cycles (~30 seconds)
///    - Write a JSONL status record at the telemetry interval
///    - Handle Ctrl+C for graceful shutdown
///
/// 3. **Graceful Shutdown**
///    - Stop polling and close the adapter
///    - Log total frame counts
///    - Clean exit
///
/// # Errors
///
/// Returns error if:
/// - The configuration file is invalid
/// - No joybus adapter is found
/// - The calibration parameters are rejected
///
/// # Examples
///
/// Run the application:
/// ```bash
/// cargo run --release -- config/default.toml
/// ```
///
/// Expected output:
/// ```text
/// INFO joybus_pad: Joybus Pad v0.1.0 starting...
/// INFO joybus_pad::serial: Successfully opened joybus adapter at /dev/ttyAMA0
/// INFO joybus_pad: Polling gamecube pad every 15ms
/// INFO joybus_pad::controller::poller: Controller link established
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration before logging is up; failures surface through
    // the returned error
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let (config, config_source) = if Path::new(&config_path).exists() {
        (Config::load(&config_path)?, config_path)
    } else {
        (Config::load_defaults()?, "built-in defaults".to_string())
    };

    // Initialize logging; the guard must outlive the loop so buffered
    // file output is flushed on exit
    let _guard = init_logging(&config.log.dir);

    info!("Joybus Pad v{} starting...", env!("CARGO_PKG_VERSION"));
    info!("Configuration: {}", config_source);

    match config.controller.family.as_str() {
        "n64" => {
            let calibration = N64Calibration::from_params(config.n64_params())?;
            let bus = open_bus::<N64Frame>(&config)?;
            let pad = N64Pad::new(
                bus,
                calibration,
                config.poll_timing(),
                config.poll.link_down_threshold,
            );
            run_pad(pad, &config).await
        }
        _ => {
            let calibration = GameCubeCalibration::from_params(config.gamecube_params())?;
            let bus = open_bus::<GameCubeFrame>(&config)?;
            let pad = GameCubePad::new(
                bus,
                calibration,
                config.poll_timing(),
                config.poll.link_down_threshold,
            );
            run_pad(pad, &config).await
        }
    }
}

/// Set up the tracing subscriber
///
/// Logs to stderr; when `dir` is non-empty, also to a daily-rotated file
/// in that directory. The returned guard keeps the file writer alive.
fn init_logging(dir: &str) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    if dir.is_empty() {
        tracing_subscriber::fmt().with_env_filter(filter).init();
        None
    } else {
        let appender = tracing_appender::rolling::daily(dir, "joybus-pad.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(false)
            .init();
        Some(guard)
    }
}

/// Open the joybus adapter from the serial configuration
///
/// An empty `serial.port` auto-detects across the default device paths.
fn open_bus<F: WireFrame>(config: &Config) -> Result<JoybusSerial<F>> {
    let read_timeout = Duration::from_millis(config.serial.read_timeout_ms);

    let serial = if config.serial.port.is_empty() {
        JoybusSerial::open_configured(DEFAULT_DEVICE_PATHS, config.serial.baud_rate, read_timeout)?
    } else {
        JoybusSerial::open_configured(
            &[config.serial.port.as_str()],
            config.serial.baud_rate,
            read_timeout,
        )?
    };

    info!("Joybus adapter opened at: {}", serial.device_path());
    Ok(serial)
}

/// Drive one pad until Ctrl+C
///
/// The poll loop sleeps for whatever delay the driver returns from each
/// tick, so the request/parse rhythm stays under driver control. Status
/// records are written on a fixed interval alongside the poll cycle.
async fn run_pad<D: PadDriver>(mut pad: D, config: &Config) -> Result<()> {
    pad.start().await?;
    info!(
        "Polling {} pad every {}ms",
        pad.family(),
        config.poll.period_ms
    );
    info!("Press Ctrl+C to exit");

    let mut status_logger = if config.telemetry.enabled {
        Some(StatusLogger::new(
            &config.telemetry.log_dir,
            config.telemetry.max_records_per_file,
            config.telemetry.max_files_to_keep,
        ))
    } else {
        None
    };

    let mut status_interval = interval(Duration::from_millis(config.telemetry.log_interval_ms));

    let mut tick_count: u64 = 0;
    let mut last_log_count: u64 = 0;

    let sleep = tokio::time::sleep(Duration::ZERO);
    tokio::pin!(sleep);

    // Main poll loop
    loop {
        tokio::select! {
            // Step the poll cycle when its delay elapses
            () = &mut sleep => {
                let delay = pad.tick().await;
                sleep.as_mut().reset(tokio::time::Instant::now() + delay);

                tick_count += 1;
                if tick_count - last_log_count >= LOG_INTERVAL_TICKS {
                    let stats = pad.stats();
                    info!(
                        "Polled {} frames ({} failed, link {})",
                        stats.frames_ok,
                        stats.frames_failed,
                        if stats.link_up { "up" } else { "down" }
                    );
                    last_log_count = tick_count;
                }
            }

            // Periodic status snapshot
            _ = status_interval.tick() => {
                debug!(
                    "joy1=({}, {}) joy2=({}, {}) triggers=({}, {}) accept={}",
                    pad.joy1_x(),
                    pad.joy1_y(),
                    pad.joy2_x(),
                    pad.joy2_y(),
                    pad.trigger_l(),
                    pad.trigger_r(),
                    pad.accept(),
                );

                if let Some(logger) = status_logger.as_mut() {
                    let record = StatusRecord::now(pad.family(), pad.stats());
                    if let Err(e) = logger.log(&record) {
                        warn!("Failed to write status record: {}", e);
                    }
                }
            }

            // Handle Ctrl+C for graceful shutdown
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    pad.stop().await?;
    let stats = pad.stats();
    info!(
        "Total frames: {} ok, {} failed",
        stats.frames_ok, stats.frames_failed
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_path() {
        assert_eq!(DEFAULT_CONFIG_PATH, "config/default.toml");
    }

    #[test]
    fn test_log_interval_constant() {
        // Verify log interval is reasonable
        assert_eq!(LOG_INTERVAL_TICKS, 4000);

        // Two ticks per poll cycle at the default 15ms period
        let seconds = (LOG_INTERVAL_TICKS / 2) * 15 / 1000;
        assert_eq!(seconds, 30, "Log interval should be 30 seconds at 15ms");
    }
}
