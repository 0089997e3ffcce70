//! # Joybus Pad Library
//!
//! Poll GameCube and N64 controllers over a serial joybus adapter.
//!
//! This library provides the core functionality for polling joybus
//! controllers, calibrating their raw axis samples, and exposing a
//! family-independent input surface.

pub mod config;
pub mod error;
pub mod joybus;
pub mod controller;
pub mod serial;
pub mod telemetry;
