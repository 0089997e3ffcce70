//! # GameCube Pad Module
//!
//! [`PadDriver`] for standard GameCube controllers. Raw frames from the bus
//! are projected through per-axis calibration into the normalized input
//! surface.
//!
//! ## Button Slot Layout
//!
//! | Slot | Physical button |
//! |------|-----------------|
//! | `B0` | A |
//! | `B1` | B |
//! | `B2` | X |
//! | `B3` | Y |
//! | `B4` | Z |
//! | `B5` | L |
//! | `B6` | R |
//! | `B7` | Start |
//!
//! The analog triggers report through `trigger_l`/`trigger_r`; the digital
//! clicks at the end of their travel are the L and R button slots.

use std::time::Duration;

use async_trait::async_trait;

use crate::controller::axis::{
    AxisError, CenteredAxis, CenteredParams, LinearAxis, LinearParams,
};
use crate::controller::driver::{Direction, InputPad, PadButton, PadDriver};
use crate::controller::poller::{PadPoller, PollStats, PollTiming};
use crate::error::Result;
use crate::joybus::bus::PadBus;
use crate::joybus::frame::{GameCubeFrame, GcButton};

/// Calibration parameters for every GameCube axis.
///
/// The defaults describe an unworn pad: main stick travel around ±100
/// counts, C stick slightly shorter, triggers resting near 30 with full
/// pull around 200.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameCubeParams {
    pub stick_x: CenteredParams,
    pub stick_y: CenteredParams,
    pub c_stick_x: CenteredParams,
    pub c_stick_y: CenteredParams,
    pub trigger_l: LinearParams,
    pub trigger_r: LinearParams,
}

impl Default for GameCubeParams {
    fn default() -> Self {
        let stick = CenteredParams {
            min: -100,
            max: 100,
            center: 0,
            deadzone: 6,
        };
        let c_stick = CenteredParams {
            min: -90,
            max: 90,
            center: 0,
            deadzone: 8,
        };
        let trigger = LinearParams {
            min: 30,
            max: 200,
            deadzone: 10,
        };
        Self {
            stick_x: stick,
            stick_y: stick,
            c_stick_x: c_stick,
            c_stick_y: c_stick,
            trigger_l: trigger,
            trigger_r: trigger,
        }
    }
}

/// Validated calibration for a GameCube pad.
#[derive(Debug, Clone, Copy)]
pub struct GameCubeCalibration {
    pub stick_x: CenteredAxis,
    pub stick_y: CenteredAxis,
    pub c_stick_x: CenteredAxis,
    pub c_stick_y: CenteredAxis,
    pub trigger_l: LinearAxis,
    pub trigger_r: LinearAxis,
}

impl GameCubeCalibration {
    /// Builds a calibration from axis parameters.
    ///
    /// # Errors
    ///
    /// Returns [`AxisError`] if any axis has an inverted range or a center
    /// outside its range.
    pub fn from_params(params: GameCubeParams) -> std::result::Result<Self, AxisError> {
        Ok(Self {
            stick_x: CenteredAxis::new(params.stick_x)?,
            stick_y: CenteredAxis::new(params.stick_y)?,
            c_stick_x: CenteredAxis::new(params.c_stick_x)?,
            c_stick_y: CenteredAxis::new(params.c_stick_y)?,
            trigger_l: LinearAxis::new(params.trigger_l)?,
            trigger_r: LinearAxis::new(params.trigger_r)?,
        })
    }

    /// Factory-typical calibration for an unworn pad.
    ///
    /// # Errors
    ///
    /// Never fails in practice; the default parameters are valid.
    ///
    /// # Examples
    ///
    /// ```
    /// use joybus_pad::controller::axis::{OUT_MAX, OUT_MID, OUT_MIN};
    /// use joybus_pad::controller::gamecube::GameCubeCalibration;
    ///
    /// let calibration = GameCubeCalibration::standard()?;
    ///
    /// // Resting stick and trigger read neutral
    /// assert_eq!(calibration.stick_x.parse(0), OUT_MID);
    /// assert_eq!(calibration.trigger_l.parse(30), OUT_MIN);
    ///
    /// // Full deflection and full pull reach the bounds
    /// assert_eq!(calibration.stick_x.parse(100), OUT_MAX);
    /// assert_eq!(calibration.trigger_l.parse(200), OUT_MAX);
    /// # Ok::<(), joybus_pad::controller::axis::AxisError>(())
    /// ```
    pub fn standard() -> std::result::Result<Self, AxisError> {
        Self::from_params(GameCubeParams::default())
    }
}

/// Polled GameCube controller over any [`PadBus`].
pub struct GameCubePad<B: PadBus<Frame = GameCubeFrame>> {
    poller: PadPoller<B>,
    calibration: GameCubeCalibration,
}

impl<B: PadBus<Frame = GameCubeFrame>> GameCubePad<B> {
    /// Creates a stopped pad around a bus.
    ///
    /// The frame record is seeded with the calibration's resting values so
    /// every getter reads neutral until the first successful poll.
    pub fn new(
        mut bus: B,
        calibration: GameCubeCalibration,
        timing: PollTiming,
        link_down_threshold: u32,
    ) -> Self {
        let frame = bus.frame_mut();
        frame.stick_x = calibration.stick_x.raw_center();
        frame.stick_y = calibration.stick_y.raw_center();
        frame.c_stick_x = calibration.c_stick_x.raw_center();
        frame.c_stick_y = calibration.c_stick_y.raw_center();
        frame.trigger_l = calibration.trigger_l.raw_min();
        frame.trigger_r = calibration.trigger_r.raw_min();

        Self {
            poller: PadPoller::new(bus, timing, link_down_threshold),
            calibration,
        }
    }

    fn frame(&self) -> &GameCubeFrame {
        self.poller.bus().frame()
    }
}

impl<B: PadBus<Frame = GameCubeFrame>> InputPad for GameCubePad<B> {
    fn direction(&self) -> Direction {
        let frame = self.frame();
        Direction {
            up: frame.pressed(GcButton::DpadUp),
            down: frame.pressed(GcButton::DpadDown),
            left: frame.pressed(GcButton::DpadLeft),
            right: frame.pressed(GcButton::DpadRight),
        }
    }

    fn button(&self, button: PadButton) -> bool {
        let physical = match button {
            PadButton::B0 => GcButton::A,
            PadButton::B1 => GcButton::B,
            PadButton::B2 => GcButton::X,
            PadButton::B3 => GcButton::Y,
            PadButton::B4 => GcButton::Z,
            PadButton::B5 => GcButton::L,
            PadButton::B6 => GcButton::R,
            PadButton::B7 => GcButton::Start,
        };
        self.frame().pressed(physical)
    }

    fn joy1_x(&self) -> u16 {
        self.calibration.stick_x.parse(self.frame().stick_x)
    }

    fn joy1_y(&self) -> u16 {
        self.calibration.stick_y.parse(self.frame().stick_y)
    }

    fn joy2_x(&self) -> u16 {
        self.calibration.c_stick_x.parse(self.frame().c_stick_x)
    }

    fn joy2_y(&self) -> u16 {
        self.calibration.c_stick_y.parse(self.frame().c_stick_y)
    }

    fn trigger_l(&self) -> u16 {
        self.calibration.trigger_l.parse(self.frame().trigger_l)
    }

    fn trigger_r(&self) -> u16 {
        self.calibration.trigger_r.parse(self.frame().trigger_r)
    }
}

#[async_trait]
impl<B: PadBus<Frame = GameCubeFrame>> PadDriver for GameCubePad<B> {
    async fn start(&mut self) -> Result<()> {
        self.poller.start().await
    }

    async fn stop(&mut self) -> Result<()> {
        self.poller.stop().await
    }

    async fn tick(&mut self) -> Duration {
        self.poller.tick().await
    }

    fn stats(&self) -> PollStats {
        self.poller.stats()
    }

    fn family(&self) -> &'static str {
        "gamecube"
    }
}
