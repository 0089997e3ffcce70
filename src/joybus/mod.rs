//! # Joybus Module
//!
//! Support for Nintendo's single-wire controller bus, as exposed through a
//! serial adapter.
//!
//! This module handles:
//! - Poll commands and response framing per controller family
//! - Decoding raw responses into structured frame records
//! - Structural validation (lengths and status bits)
//! - The transport trait the poll state machine drives

pub mod bus;
pub mod frame;
pub mod protocol;
