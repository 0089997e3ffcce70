//! # Joybus Protocol Constants
//!
//! Core protocol definitions for polling Nintendo controllers over the
//! joybus, as seen through a serial adapter.
//!
//! The joybus is a single-wire bus, so every command written to the adapter
//! is echoed back on the receive side before the controller's response.
//! Decoders must skip the echoed command bytes.

/// GameCube poll command: 0x40 (poll), mode 3, rumble off
pub const GC_POLL_COMMAND: [u8; 3] = [0x40, 0x03, 0x00];

/// GameCube poll response length in bytes (buttons + sticks + triggers)
pub const GC_RESPONSE_LEN: usize = 8;

/// GameCube status byte 0: error flag, must be clear in a valid response
pub const GC_STATUS_ERROR_MASK: u8 = 0x80;

/// GameCube status byte 1: check bit, always set in a valid response
pub const GC_STATUS_CHECK_MASK: u8 = 0x80;

/// GameCube stick bytes are unsigned with 0x80 at center; XOR with this
/// bias converts them to signed two's complement
pub const GC_STICK_BIAS: u8 = 0x80;

/// N64 poll command
pub const N64_POLL_COMMAND: [u8; 1] = [0x01];

/// N64 poll response length in bytes (buttons + stick)
pub const N64_RESPONSE_LEN: usize = 4;

/// N64 status byte 1: reserved bit, must be clear in a valid response
pub const N64_STATUS_RESERVED_MASK: u8 = 0x40;

/// Default poll cycle period in milliseconds
pub const DEFAULT_POLL_PERIOD_MS: u64 = 15;

/// Delay between issuing a GameCube poll and reading its response.
///
/// 8 response bytes plus the 3-byte echo take just under 2ms to arrive
/// through the adapter at the default baud rate.
pub const GC_RESPONSE_DELAY_MS: u64 = 2;

/// Delay between issuing an N64 poll and reading its response.
///
/// The 4-byte N64 response is short enough to arrive within 1ms.
pub const N64_RESPONSE_DELAY_MS: u64 = 1;
