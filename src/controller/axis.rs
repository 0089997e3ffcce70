//! # Axis Calibration Module
//!
//! Maps raw 8-bit controller samples onto the normalized `0..=65535` output
//! range with deadzone suppression and clamping.
//!
//! ## Centered Axes
//!
//! Joysticks rest near a center value and deflect both ways. A centered axis
//! maps its raw center, plus a deadzone radius around it, to the exact output
//! midpoint. Each side of the center is then rescaled linearly onto its half
//! of the output range. Worn sticks rarely have symmetric travel, so the two
//! sides are rescaled independently from their own raw spans.
//!
//! Values within the deadzone are a flat plateau at the midpoint, not an
//! attenuation: moving the stick inside the radius reads exactly neutral.
//!
//! ## Linear Axes
//!
//! Triggers and sliders rest at a minimum and deflect one way. A linear axis
//! rescales the raw span onto the full output range. The deadzone is a floor
//! in the raw domain: offsets at or below it snap to the output minimum, and
//! offsets past it map by the same linear rescale as the rest of the travel.
//!
//! ## Usage
//!
//! ```
//! use joybus_pad::controller::axis::{CenteredAxis, CenteredParams, OUT_MID};
//!
//! let axis = CenteredAxis::new(CenteredParams {
//!     min: -100,
//!     max: 100,
//!     center: 0,
//!     deadzone: 8,
//! })?;
//!
//! // Resting inside the deadzone reads exactly neutral
//! assert_eq!(axis.parse(0), OUT_MID);
//! assert_eq!(axis.parse(-8), OUT_MID);
//!
//! // Full deflection reaches the output bounds
//! assert_eq!(axis.parse(100), 65535);
//! assert_eq!(axis.parse(-100), 0);
//! # Ok::<(), joybus_pad::controller::axis::AxisError>(())
//! ```

use thiserror::Error;

/// Low end of the normalized output range.
pub const OUT_MIN: u16 = 0;

/// Midpoint of the normalized output range, reported inside deadzones.
pub const OUT_MID: u16 = u16::MAX / 2;

/// High end of the normalized output range.
pub const OUT_MAX: u16 = u16::MAX;

/// Output span above the midpoint.
const UPPER_SPAN: i32 = (OUT_MAX - OUT_MID) as i32;

/// Output span below the midpoint.
const LOWER_SPAN: i32 = (OUT_MID - OUT_MIN) as i32;

/// Errors for invalid axis calibration parameters.
///
/// Parameters are checked once at construction; `parse` never fails.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AxisError {
    /// `min` is greater than `max`.
    #[error("axis range is inverted: min {min} > max {max}")]
    InvertedRange { min: i16, max: i16 },

    /// `center` falls outside `min..=max`.
    #[error("axis center {center} outside range {min}..={max}")]
    CenterOutOfRange { min: i16, max: i16, center: i16 },
}

/// Calibration parameters for a centered (joystick) axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CenteredParams {
    /// Raw value at full negative deflection.
    pub min: i8,
    /// Raw value at full positive deflection.
    pub max: i8,
    /// Raw value at rest.
    pub center: i8,
    /// Deadzone radius around the center, in raw units.
    pub deadzone: u8,
}

/// Calibrated transform for a centered axis: raw `i8` to `0..=65535`.
#[derive(Debug, Clone, Copy)]
pub struct CenteredAxis {
    params: CenteredParams,
}

impl CenteredAxis {
    /// Creates a centered axis from validated parameters.
    ///
    /// # Errors
    ///
    /// Returns [`AxisError`] if `min > max` or `center` is outside the range.
    /// A center equal to `min` or `max` is accepted; the empty side then
    /// behaves as an extension of the deadzone.
    ///
    /// # Examples
    ///
    /// ```
    /// use joybus_pad::controller::axis::{CenteredAxis, CenteredParams};
    ///
    /// let axis = CenteredAxis::new(CenteredParams {
    ///     min: -100,
    ///     max: 100,
    ///     center: 0,
    ///     deadzone: 8,
    /// });
    /// assert!(axis.is_ok());
    /// ```
    pub fn new(params: CenteredParams) -> Result<Self, AxisError> {
        if params.min > params.max {
            return Err(AxisError::InvertedRange {
                min: params.min.into(),
                max: params.max.into(),
            });
        }
        if params.center < params.min || params.center > params.max {
            return Err(AxisError::CenterOutOfRange {
                min: params.min.into(),
                max: params.max.into(),
                center: params.center.into(),
            });
        }

        Ok(Self { params })
    }

    /// Returns the calibration parameters.
    #[must_use]
    pub const fn params(&self) -> CenteredParams {
        self.params
    }

    /// Returns the raw value this axis maps to the output midpoint.
    ///
    /// Drivers seed their frame records with this value so getters read
    /// neutral before the first successful poll.
    #[must_use]
    pub const fn raw_center(&self) -> i8 {
        self.params.center
    }

    /// Returns the output value reported while the axis rests in the deadzone.
    #[must_use]
    pub const fn neutral(&self) -> u16 {
        OUT_MID
    }

    /// Parses a raw sample into the normalized output range.
    ///
    /// Raw values beyond `min`/`max` saturate at the output bounds; values
    /// within the deadzone radius of the center report exactly the midpoint.
    ///
    /// # Examples
    ///
    /// ```
    /// use joybus_pad::controller::axis::{CenteredAxis, CenteredParams, OUT_MID};
    ///
    /// let axis = CenteredAxis::new(CenteredParams {
    ///     min: -100,
    ///     max: 100,
    ///     center: 0,
    ///     deadzone: 8,
    /// })?;
    ///
    /// assert_eq!(axis.parse(5), OUT_MID);
    /// assert!(axis.parse(9) > OUT_MID);
    /// assert!(axis.parse(-9) < OUT_MID);
    /// # Ok::<(), joybus_pad::controller::axis::AxisError>(())
    /// ```
    #[must_use]
    pub fn parse(&self, raw: i8) -> u16 {
        let delta = i32::from(raw) - i32::from(self.params.center);
        let deadzone = i32::from(self.params.deadzone);

        if delta.abs() <= deadzone {
            return OUT_MID;
        }

        if delta > 0 {
            let raw_span = i32::from(self.params.max) - i32::from(self.params.center) - deadzone;
            if raw_span <= 0 {
                // The whole side sits inside the deadzone
                return OUT_MID;
            }
            let offset = (delta - deadzone).min(raw_span);
            OUT_MID + (offset * UPPER_SPAN / raw_span) as u16
        } else {
            let raw_span = i32::from(self.params.center) - i32::from(self.params.min) - deadzone;
            if raw_span <= 0 {
                return OUT_MID;
            }
            let offset = (-delta - deadzone).min(raw_span);
            OUT_MID - (offset * LOWER_SPAN / raw_span) as u16
        }
    }
}

/// Calibration parameters for a linear (trigger/slider) axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearParams {
    /// Raw value at rest.
    pub min: u8,
    /// Raw value at full deflection.
    pub max: u8,
    /// Deadzone floor above the resting point, in raw units.
    pub deadzone: u8,
}

/// Calibrated transform for a linear axis: raw `u8` to `0..=65535`.
#[derive(Debug, Clone, Copy)]
pub struct LinearAxis {
    params: LinearParams,
}

impl LinearAxis {
    /// Creates a linear axis from validated parameters.
    ///
    /// # Errors
    ///
    /// Returns [`AxisError::InvertedRange`] if `min > max`.
    ///
    /// # Examples
    ///
    /// ```
    /// use joybus_pad::controller::axis::{LinearAxis, LinearParams};
    ///
    /// let axis = LinearAxis::new(LinearParams {
    ///     min: 30,
    ///     max: 200,
    ///     deadzone: 10,
    /// });
    /// assert!(axis.is_ok());
    /// ```
    pub fn new(params: LinearParams) -> Result<Self, AxisError> {
        if params.min > params.max {
            return Err(AxisError::InvertedRange {
                min: params.min.into(),
                max: params.max.into(),
            });
        }

        Ok(Self { params })
    }

    /// Returns the calibration parameters.
    #[must_use]
    pub const fn params(&self) -> LinearParams {
        self.params
    }

    /// Returns the raw value at rest.
    ///
    /// Drivers seed their frame records with this value so trigger getters
    /// read released before the first successful poll.
    #[must_use]
    pub const fn raw_min(&self) -> u8 {
        self.params.min
    }

    /// Parses a raw sample into the normalized output range.
    ///
    /// Raw values beyond `min`/`max` saturate at the output bounds; offsets
    /// at or below the deadzone floor snap to the output minimum.
    ///
    /// # Examples
    ///
    /// ```
    /// use joybus_pad::controller::axis::{LinearAxis, LinearParams};
    ///
    /// let axis = LinearAxis::new(LinearParams {
    ///     min: 0,
    ///     max: 255,
    ///     deadzone: 10,
    /// })?;
    ///
    /// assert_eq!(axis.parse(0), 0);
    /// assert_eq!(axis.parse(10), 0);
    /// assert!(axis.parse(11) > 0);
    /// assert_eq!(axis.parse(255), 65535);
    /// # Ok::<(), joybus_pad::controller::axis::AxisError>(())
    /// ```
    #[must_use]
    pub fn parse(&self, raw: u8) -> u16 {
        let raw_span = i32::from(self.params.max) - i32::from(self.params.min);
        if raw_span <= 0 {
            return OUT_MIN;
        }

        let clamped = raw.clamp(self.params.min, self.params.max);
        let offset = i32::from(clamped) - i32::from(self.params.min);
        if offset <= i32::from(self.params.deadzone) {
            return OUT_MIN;
        }

        (offset * i32::from(OUT_MAX) / raw_span) as u16
    }
}
