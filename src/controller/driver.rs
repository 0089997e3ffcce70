//! # Pad Driver Module
//!
//! Family-independent surface for polled controllers. Consumers read
//! calibrated values through [`InputPad`] without knowing which controller
//! family produced them, and drive the poll loop through [`PadDriver`].
//!
//! All axes report in the normalized `0..=65535` range: joysticks rest at
//! the midpoint, triggers rest at zero. Buttons map onto eight generic
//! slots; slots a family has no physical button for always read released.
//!
//! ## Usage
//!
//! ```no_run
//! use joybus_pad::controller::driver::{InputPad, PadDriver};
//! use joybus_pad::controller::gamecube::{GameCubeCalibration, GameCubePad};
//! use joybus_pad::controller::poller::PollTiming;
//! use joybus_pad::joybus::frame::GameCubeFrame;
//! use joybus_pad::serial::JoybusSerial;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let bus = JoybusSerial::<GameCubeFrame>::open()?;
//!     let calibration = GameCubeCalibration::standard()?;
//!     let mut pad = GameCubePad::new(bus, calibration, PollTiming::gamecube(), 3);
//!
//!     pad.start().await?;
//!     loop {
//!         let delay = pad.tick().await;
//!         if pad.accept() {
//!             println!("A held, stick at ({}, {})", pad.joy1_x(), pad.joy1_y());
//!         }
//!         tokio::time::sleep(delay).await;
//!     }
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;

use crate::controller::poller::PollStats;
use crate::error::Result;

/// D-pad state as four independent directions.
///
/// Opposing directions are reported as the hardware sent them; the pad
/// itself prevents simultaneous opposites on an intact mechanism.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Direction {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

/// Generic button slots shared by every controller family.
///
/// Families assign their physical buttons to slots in a fixed order, with
/// the primary action on [`PadButton::B0`] and the menu button on
/// [`PadButton::B7`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PadButton {
    B0,
    B1,
    B2,
    B3,
    B4,
    B5,
    B6,
    B7,
}

impl PadButton {
    /// All slots in order, for iterating logs or bindings.
    ///
    /// # Examples
    ///
    /// ```
    /// use joybus_pad::controller::driver::PadButton;
    ///
    /// assert_eq!(PadButton::ALL.len(), 8);
    /// assert_eq!(PadButton::ALL[0], PadButton::B0);
    /// ```
    pub const ALL: [PadButton; 8] = [
        PadButton::B0,
        PadButton::B1,
        PadButton::B2,
        PadButton::B3,
        PadButton::B4,
        PadButton::B5,
        PadButton::B6,
        PadButton::B7,
    ];
}

/// Read access to a controller's calibrated state.
///
/// Getters are pure projections of the last accepted frame: they never
/// touch the bus, and they keep reporting the last good state while polls
/// fail. Before the first successful poll every getter reads its neutral
/// value.
///
/// # Examples
///
/// ```
/// use joybus_pad::controller::driver::{Direction, InputPad, PadButton};
///
/// # struct OneButton(PadButton);
/// # impl InputPad for OneButton {
/// #     fn direction(&self) -> Direction { Direction::default() }
/// #     fn button(&self, button: PadButton) -> bool { button == self.0 }
/// #     fn joy1_x(&self) -> u16 { 32767 }
/// #     fn joy1_y(&self) -> u16 { 32767 }
/// #     fn joy2_x(&self) -> u16 { 32767 }
/// #     fn joy2_y(&self) -> u16 { 32767 }
/// #     fn trigger_l(&self) -> u16 { 0 }
/// #     fn trigger_r(&self) -> u16 { 0 }
/// # }
/// let pad = OneButton(PadButton::B0);
///
/// assert!(pad.accept());   // Confirm is slot B0
/// assert!(!pad.reject());  // Cancel is slot B1
/// assert!(!pad.home());    // Menu is slot B7
/// ```
pub trait InputPad {
    /// Returns the d-pad state.
    fn direction(&self) -> Direction;

    /// Returns whether a button slot is held.
    fn button(&self, button: PadButton) -> bool;

    /// Returns the primary stick X axis, midpoint at rest.
    fn joy1_x(&self) -> u16;

    /// Returns the primary stick Y axis, midpoint at rest.
    fn joy1_y(&self) -> u16;

    /// Returns the secondary stick X axis, midpoint at rest.
    fn joy2_x(&self) -> u16;

    /// Returns the secondary stick Y axis, midpoint at rest.
    fn joy2_y(&self) -> u16;

    /// Returns the left trigger, zero at rest.
    fn trigger_l(&self) -> u16;

    /// Returns the right trigger, zero at rest.
    fn trigger_r(&self) -> u16;

    /// Returns whether the confirm action is held.
    fn accept(&self) -> bool {
        self.button(PadButton::B0)
    }

    /// Returns whether the cancel action is held.
    fn reject(&self) -> bool {
        self.button(PadButton::B1)
    }

    /// Returns whether the menu button is held.
    fn home(&self) -> bool {
        self.button(PadButton::B7)
    }
}

/// A pollable controller: the [`InputPad`] surface plus cycle control.
#[async_trait]
pub trait PadDriver: InputPad + Send {
    /// Opens the bus and begins polling.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying bus fails to start.
    async fn start(&mut self) -> Result<()>;

    /// Stops polling and closes the bus.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying bus fails to stop.
    async fn stop(&mut self) -> Result<()>;

    /// Performs one poll step and returns the delay until the next.
    async fn tick(&mut self) -> Duration;

    /// Returns a snapshot of the poll counters.
    fn stats(&self) -> PollStats;

    /// Returns the controller family name, for logs and telemetry.
    fn family(&self) -> &'static str;
}
