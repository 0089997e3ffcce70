//! # N64 Pad Module
//!
//! [`PadDriver`] for N64 controllers. The N64 pad has no second analog
//! stick and no analog triggers, so the driver synthesizes both from
//! digital inputs to keep the input surface uniform.
//!
//! ## Button Slot Layout
//!
//! | Slot | Physical button |
//! |------|-----------------|
//! | `B0` | A |
//! | `B1` | B |
//! | `B2` | none |
//! | `B3` | none |
//! | `B4` | Z |
//! | `B5` | L |
//! | `B6` | R |
//! | `B7` | Start |
//!
//! The C buttons drive the secondary stick axes at full deflection, the
//! L and R bumpers drive the triggers at full pull. The C buttons stay
//! readable as plain bits through the frame; only the synthesized view is
//! exposed here.

use std::time::Duration;

use async_trait::async_trait;

use crate::controller::axis::{AxisError, CenteredAxis, CenteredParams, OUT_MAX, OUT_MID, OUT_MIN};
use crate::controller::driver::{Direction, InputPad, PadButton, PadDriver};
use crate::controller::poller::{PadPoller, PollStats, PollTiming};
use crate::error::Result;
use crate::joybus::bus::PadBus;
use crate::joybus::frame::{N64Button, N64Frame};

/// Calibration parameters for the N64 stick.
///
/// The defaults match an unworn pad: the octagonal gate limits travel to
/// about ±80 counts on the cardinals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct N64Params {
    pub stick_x: CenteredParams,
    pub stick_y: CenteredParams,
}

impl Default for N64Params {
    fn default() -> Self {
        let stick = CenteredParams {
            min: -80,
            max: 80,
            center: 0,
            deadzone: 6,
        };
        Self {
            stick_x: stick,
            stick_y: stick,
        }
    }
}

/// Validated calibration for an N64 pad.
#[derive(Debug, Clone, Copy)]
pub struct N64Calibration {
    pub stick_x: CenteredAxis,
    pub stick_y: CenteredAxis,
}

impl N64Calibration {
    /// Builds a calibration from axis parameters.
    ///
    /// # Errors
    ///
    /// Returns [`AxisError`] if either axis has an inverted range or a
    /// center outside its range.
    pub fn from_params(params: N64Params) -> std::result::Result<Self, AxisError> {
        Ok(Self {
            stick_x: CenteredAxis::new(params.stick_x)?,
            stick_y: CenteredAxis::new(params.stick_y)?,
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
    /// use joybus_pad::controller::axis::{OUT_MAX, OUT_MID};
    /// use joybus_pad::controller::n64::N64Calibration;
    ///
    /// let calibration = N64Calibration::standard()?;
    /// assert_eq!(calibration.stick_x.parse(0), OUT_MID);  // Resting
    /// assert_eq!(calibration.stick_x.parse(80), OUT_MAX); // At the gate
    /// # Ok::<(), joybus_pad::controller::axis::AxisError>(())
    /// ```
    pub fn standard() -> std::result::Result<Self, AxisError> {
        Self::from_params(N64Params::default())
    }
}

/// Polled N64 controller over any [`PadBus`].
pub struct N64Pad<B: PadBus<Frame = N64Frame>> {
    poller: PadPoller<B>,
    calibration: N64Calibration,
}

impl<B: PadBus<Frame = N64Frame>> N64Pad<B> {
    /// Creates a stopped pad around a bus.
    ///
    /// The frame record is seeded with the calibration's resting stick so
    /// getters read neutral until the first successful poll.
    pub fn new(
        mut bus: B,
        calibration: N64Calibration,
        timing: PollTiming,
        link_down_threshold: u32,
    ) -> Self {
        let frame = bus.frame_mut();
        frame.stick_x = calibration.stick_x.raw_center();
        frame.stick_y = calibration.stick_y.raw_center();

        Self {
            poller: PadPoller::new(bus, timing, link_down_threshold),
            calibration,
        }
    }

    fn frame(&self) -> &N64Frame {
        self.poller.bus().frame()
    }

    /// Maps a pair of opposing digital inputs onto one synthetic axis.
    fn synthetic_axis(low: bool, high: bool) -> u16 {
        match (low, high) {
            (true, false) => OUT_MIN,
            (false, true) => OUT_MAX,
            _ => OUT_MID,
        }
    }
}

impl<B: PadBus<Frame = N64Frame>> InputPad for N64Pad<B> {
    fn direction(&self) -> Direction {
        let frame = self.frame();
        Direction {
            up: frame.pressed(N64Button::DpadUp),
            down: frame.pressed(N64Button::DpadDown),
            left: frame.pressed(N64Button::DpadLeft),
            right: frame.pressed(N64Button::DpadRight),
        }
    }

    fn button(&self, button: PadButton) -> bool {
        let physical = match button {
            PadButton::B0 => N64Button::A,
            PadButton::B1 => N64Button::B,
            PadButton::B4 => N64Button::Z,
            PadButton::B5 => N64Button::L,
            PadButton::B6 => N64Button::R,
            PadButton::B7 => N64Button::Start,
            // No physical counterpart on this pad
            PadButton::B2 | PadButton::B3 => return false,
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
        let frame = self.frame();
        Self::synthetic_axis(
            frame.pressed(N64Button::CLeft),
            frame.pressed(N64Button::CRight),
        )
    }

    fn joy2_y(&self) -> u16 {
        let frame = self.frame();
        Self::synthetic_axis(
            frame.pressed(N64Button::CDown),
            frame.pressed(N64Button::CUp),
        )
    }

    fn trigger_l(&self) -> u16 {
        if self.frame().pressed(N64Button::L) {
            OUT_MAX
        } else {
            OUT_MIN
        }
    }

    fn trigger_r(&self) -> u16 {
        if self.frame().pressed(N64Button::R) {
            OUT_MAX
        } else {
            OUT_MIN
        }
    }
}

#[async_trait]
impl<B: PadBus<Frame = N64Frame>> PadDriver for N64Pad<B> {
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
        "n64"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::joybus::bus::mocks::{DecodeOutcome, FakeBus};

    fn standard_pad() -> N64Pad<FakeBus<N64Frame>> {
        N64Pad::new(
            FakeBus::new(),
            N64Calibration::standard().unwrap(),
            PollTiming::n64(),
            5,
        )
    }

    /// Polls one frame into the pad.
    async fn poll_frame(pad: &mut N64Pad<FakeBus<N64Frame>>, frame: N64Frame) {
        pad.poller.bus().push_outcome(DecodeOutcome::Ok(frame));
        pad.tick().await;
        pad.tick().await;
    }

    // ==================== Neutral State Tests ====================

    #[test]
    fn test_neutral_before_first_poll() {
        let pad = standard_pad();

        assert_eq!(pad.joy1_x(), OUT_MID);
        assert_eq!(pad.joy1_y(), OUT_MID);
        assert_eq!(pad.joy2_x(), OUT_MID);
        assert_eq!(pad.joy2_y(), OUT_MID);
        assert_eq!(pad.trigger_l(), OUT_MIN);
        assert_eq!(pad.trigger_r(), OUT_MIN);
        assert_eq!(pad.direction(), Direction::default());
    }

    #[test]
    fn test_seeding_respects_offset_center() {
        let mut params = N64Params::default();
        params.stick_y.center = -12;
        let calibration = N64Calibration::from_params(params).unwrap();

        let pad = N64Pad::new(FakeBus::new(), calibration, PollTiming::n64(), 5);
        assert_eq!(pad.joy1_y(), OUT_MID);
    }

    // ==================== Stick Tests ====================

    #[tokio::test]
    async fn test_stick_projection_hits_bounds_at_gate() {
        let mut pad = standard_pad();
        pad.start().await.unwrap();

        let mut frame = N64Frame::default();
        frame.stick_x = 80;
        frame.stick_y = -80;
        poll_frame(&mut pad, frame).await;

        assert_eq!(pad.joy1_x(), OUT_MAX);
        assert_eq!(pad.joy1_y(), OUT_MIN);
    }

    // ==================== Button Mapping Tests ====================

    #[tokio::test]
    async fn test_button_slots_follow_n64_layout() {
        let layout = [
            (PadButton::B0, N64Button::A),
            (PadButton::B1, N64Button::B),
            (PadButton::B4, N64Button::Z),
            (PadButton::B5, N64Button::L),
            (PadButton::B6, N64Button::R),
            (PadButton::B7, N64Button::Start),
        ];

        for (slot, physical) in layout {
            let mut pad = standard_pad();
            pad.start().await.unwrap();

            let mut frame = N64Frame::default();
            frame.press(physical);
            poll_frame(&mut pad, frame).await;

            assert!(pad.button(slot), "{:?} should press {:?}", physical, slot);
            assert!(!pad.button(PadButton::B2));
            assert!(!pad.button(PadButton::B3));
        }
    }

    #[tokio::test]
    async fn test_unmapped_slots_stay_released() {
        let mut pad = standard_pad();
        pad.start().await.unwrap();

        // Every wire bit set, including C buttons and the reset combo
        let frame = N64Frame {
            buttons: 0xFFFF,
            ..N64Frame::default()
        };
        poll_frame(&mut pad, frame).await;

        assert!(pad.button(PadButton::B0));
        assert!(!pad.button(PadButton::B2));
        assert!(!pad.button(PadButton::B3));
    }

    // ==================== Synthetic Axis Tests ====================

    #[tokio::test]
    async fn test_c_buttons_drive_secondary_stick() {
        let cases = [
            (vec![N64Button::CLeft], OUT_MIN, OUT_MID),
            (vec![N64Button::CRight], OUT_MAX, OUT_MID),
            (vec![N64Button::CUp], OUT_MID, OUT_MAX),
            (vec![N64Button::CDown], OUT_MID, OUT_MIN),
            (vec![N64Button::CLeft, N64Button::CUp], OUT_MIN, OUT_MAX),
            (vec![], OUT_MID, OUT_MID),
        ];

        for (held, want_x, want_y) in cases {
            let mut pad = standard_pad();
            pad.start().await.unwrap();

            let mut frame = N64Frame::default();
            for button in &held {
                frame.press(*button);
            }
            poll_frame(&mut pad, frame).await;

            assert_eq!(pad.joy2_x(), want_x, "held {:?}", held);
            assert_eq!(pad.joy2_y(), want_y, "held {:?}", held);
        }
    }

    #[tokio::test]
    async fn test_opposing_c_buttons_cancel_out() {
        let mut pad = standard_pad();
        pad.start().await.unwrap();

        let mut frame = N64Frame::default();
        frame.press(N64Button::CLeft);
        frame.press(N64Button::CRight);
        frame.press(N64Button::CUp);
        frame.press(N64Button::CDown);
        poll_frame(&mut pad, frame).await;

        assert_eq!(pad.joy2_x(), OUT_MID);
        assert_eq!(pad.joy2_y(), OUT_MID);
    }

    #[tokio::test]
    async fn test_bumpers_drive_digital_triggers() {
        let mut pad = standard_pad();
        pad.start().await.unwrap();

        let mut frame = N64Frame::default();
        frame.press(N64Button::L);
        poll_frame(&mut pad, frame).await;
        assert_eq!(pad.trigger_l(), OUT_MAX);
        assert_eq!(pad.trigger_r(), OUT_MIN);

        let mut frame = N64Frame::default();
        frame.press(N64Button::R);
        poll_frame(&mut pad, frame).await;
        assert_eq!(pad.trigger_l(), OUT_MIN);
        assert_eq!(pad.trigger_r(), OUT_MAX);
    }

    // ==================== Direction Tests ====================

    #[tokio::test]
    async fn test_direction_follows_dpad_bits() {
        let mut pad = standard_pad();
        pad.start().await.unwrap();

        let mut frame = N64Frame::default();
        frame.press(N64Button::DpadDown);
        frame.press(N64Button::DpadRight);
        poll_frame(&mut pad, frame).await;

        let direction = pad.direction();
        assert!(direction.down && direction.right);
        assert!(!direction.up && !direction.left);
    }

    #[test]
    fn test_family_name() {
        let pad = standard_pad();
        assert_eq!(pad.family(), "n64");
    }
}
