//! # Controller Module
//!
//! Controller polling and input projection.
//!
//! This module handles:
//! - Stepping the poll cycle and tracking link health
//! - Calibrating raw axis samples into the normalized range
//! - The family-independent input surface
//! - GameCube and N64 pad drivers

pub mod axis;
pub mod driver;
pub mod gamecube;
pub mod n64;
pub mod poller;
