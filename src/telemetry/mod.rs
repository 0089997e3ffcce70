//! # Telemetry Module
//!
//! Handles status logging to JSONL files with rotation.
//!
//! This module handles:
//! - Snapshotting poll counters into timestamped records
//! - Formatting as JSONL (JSON Lines)
//! - Writing to rotating log files
//! - Managing file rotation (max N records per file)
//! - Retaining only the last M files

pub mod logger;
pub mod types;
