//! # Controller Frame Records
//!
//! Structured snapshots of one poll response per controller family, decoded
//! from the raw joybus bytes.
//!
//! ## GameCube Response Layout (8 bytes)
//!
//! | Byte | Content |
//! |------|---------|
//! | 0 | `0 0 0 Start Y X B A` (bit 7 is the error flag) |
//! | 1 | `1 L R Z D-Up D-Down D-Right D-Left` (bit 7 always set) |
//! | 2-3 | Main stick X, Y (unsigned, 0x80 = center) |
//! | 4-5 | C-stick X, Y (unsigned, 0x80 = center) |
//! | 6-7 | Analog triggers L, R (0 = released) |
//!
//! ## N64 Response Layout (4 bytes)
//!
//! | Byte | Content |
//! |------|---------|
//! | 0 | `A B Z Start D-Up D-Down D-Left D-Right` |
//! | 1 | `Reset 0 L R C-Up C-Down C-Left C-Right` (bit 6 always clear) |
//! | 2-3 | Stick X, Y (signed two's complement) |
//!
//! Sticks are exposed as signed raw values in both families. GameCube stick
//! bytes arrive unsigned-biased and are converted during decode; N64 sticks
//! are already two's complement on the wire.

use std::fmt::Debug;

use crate::joybus::protocol::{
    GC_POLL_COMMAND, GC_RESPONSE_LEN, GC_STATUS_CHECK_MASK, GC_STATUS_ERROR_MASK, GC_STICK_BIAS,
    N64_POLL_COMMAND, N64_RESPONSE_LEN, N64_STATUS_RESERVED_MASK,
};

/// Wire-level contract for one controller family.
///
/// Implemented by the per-family frame records so the serial transport can
/// poll and decode any family generically.
pub trait WireFrame: Debug + Default + Clone + Copy + Send + Sync + 'static {
    /// Poll command written to the bus to request a frame.
    const POLL_COMMAND: &'static [u8];

    /// Response length in bytes, not counting the echoed command.
    const RESPONSE_LEN: usize;

    /// Decodes a raw response into a frame.
    ///
    /// Returns `None` if the response is structurally invalid (wrong length
    /// or bad status bits). Value plausibility is not checked here; the axis
    /// calibrators clamp out-of-range samples.
    fn decode(raw: &[u8]) -> Option<Self>;
}

/// GameCube controller buttons, as bit masks over [`GameCubeFrame::buttons`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum GcButton {
    A = 0x0100,
    B = 0x0200,
    X = 0x0400,
    Y = 0x0800,
    Start = 0x1000,
    DpadLeft = 0x0001,
    DpadRight = 0x0002,
    DpadDown = 0x0004,
    DpadUp = 0x0008,
    Z = 0x0010,
    R = 0x0020,
    L = 0x0040,
}

/// One GameCube poll snapshot.
///
/// The default value is a neutral frame: no buttons, sticks at raw center,
/// triggers released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GameCubeFrame {
    /// Button bitmask, see [`GcButton`].
    pub buttons: u16,
    /// Main stick X, signed raw.
    pub stick_x: i8,
    /// Main stick Y, signed raw.
    pub stick_y: i8,
    /// C-stick X, signed raw.
    pub c_stick_x: i8,
    /// C-stick Y, signed raw.
    pub c_stick_y: i8,
    /// Left analog trigger, 0 = released.
    pub trigger_l: u8,
    /// Right analog trigger, 0 = released.
    pub trigger_r: u8,
}

impl GameCubeFrame {
    /// Returns whether a button is held in this frame.
    #[must_use]
    pub fn pressed(&self, button: GcButton) -> bool {
        self.buttons & button as u16 != 0
    }

    /// Marks a button as held. Mostly useful when scripting frames in tests.
    pub fn press(&mut self, button: GcButton) {
        self.buttons |= button as u16;
    }

    /// Marks a button as released.
    pub fn release(&mut self, button: GcButton) {
        self.buttons &= !(button as u16);
    }
}

impl WireFrame for GameCubeFrame {
    const POLL_COMMAND: &'static [u8] = &GC_POLL_COMMAND;
    const RESPONSE_LEN: usize = GC_RESPONSE_LEN;

    fn decode(raw: &[u8]) -> Option<Self> {
        if raw.len() != Self::RESPONSE_LEN {
            return None;
        }
        if raw[0] & GC_STATUS_ERROR_MASK != 0 {
            return None;
        }
        if raw[1] & GC_STATUS_CHECK_MASK == 0 {
            return None;
        }

        Some(Self {
            // Strip the status bits so the mask carries buttons only
            buttons: u16::from_be_bytes([raw[0] & 0x1F, raw[1] & 0x7F]),
            stick_x: (raw[2] ^ GC_STICK_BIAS) as i8,
            stick_y: (raw[3] ^ GC_STICK_BIAS) as i8,
            c_stick_x: (raw[4] ^ GC_STICK_BIAS) as i8,
            c_stick_y: (raw[5] ^ GC_STICK_BIAS) as i8,
            trigger_l: raw[6],
            trigger_r: raw[7],
        })
    }
}

/// N64 controller buttons, as bit masks over [`N64Frame::buttons`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum N64Button {
    A = 0x8000,
    B = 0x4000,
    Z = 0x2000,
    Start = 0x1000,
    DpadUp = 0x0800,
    DpadDown = 0x0400,
    DpadLeft = 0x0200,
    DpadRight = 0x0100,
    /// Set by the controller when L + R + Start are held together.
    Reset = 0x0080,
    L = 0x0020,
    R = 0x0010,
    CUp = 0x0008,
    CDown = 0x0004,
    CLeft = 0x0002,
    CRight = 0x0001,
}

/// One N64 poll snapshot.
///
/// The default value is a neutral frame: no buttons, stick at raw center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct N64Frame {
    /// Button bitmask, see [`N64Button`].
    pub buttons: u16,
    /// Stick X, signed raw.
    pub stick_x: i8,
    /// Stick Y, signed raw.
    pub stick_y: i8,
}

impl N64Frame {
    /// Returns whether a button is held in this frame.
    #[must_use]
    pub fn pressed(&self, button: N64Button) -> bool {
        self.buttons & button as u16 != 0
    }

    /// Marks a button as held. Mostly useful when scripting frames in tests.
    pub fn press(&mut self, button: N64Button) {
        self.buttons |= button as u16;
    }

    /// Marks a button as released.
    pub fn release(&mut self, button: N64Button) {
        self.buttons &= !(button as u16);
    }
}

impl WireFrame for N64Frame {
    const POLL_COMMAND: &'static [u8] = &N64_POLL_COMMAND;
    const RESPONSE_LEN: usize = N64_RESPONSE_LEN;

    fn decode(raw: &[u8]) -> Option<Self> {
        if raw.len() != Self::RESPONSE_LEN {
            return None;
        }
        if raw[1] & N64_STATUS_RESERVED_MASK != 0 {
            return None;
        }

        Some(Self {
            buttons: u16::from_be_bytes([raw[0], raw[1]]),
            stick_x: raw[2] as i8,
            stick_y: raw[3] as i8,
        })
    }
}
