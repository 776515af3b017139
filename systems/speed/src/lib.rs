#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Maps the speed slider value to the simulation timestep and its label.
//!
//! The slider value doubles as the scheduling period in seconds. The mapped
//! value is a two-point linear interpolation between calibration points and
//! is surfaced as the speed multiplier shown to the player.

use std::time::Duration;

use thiserror::Error;

/// Lowest accepted slider value.
pub const MIN_VALUE: f64 = 0.009;
/// Highest accepted slider value.
pub const MAX_VALUE: f64 = 0.5;
/// Mapped value at [`MIN_VALUE`].
pub const SLOWEST_INTERVAL: f64 = 10.0;
/// Mapped value at [`MAX_VALUE`].
pub const FASTEST_INTERVAL: f64 = 1.0;
/// Slider value used when nothing else is configured.
pub const DEFAULT_VALUE: f64 = 0.1;

/// Errors raised when a slider value falls outside the calibrated domain.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum SpeedError {
    /// The value lies outside `[min, max]`. Values are never clamped.
    #[error("speed value {value} is out of the interpolation range [{min}, {max}]")]
    OutOfRange {
        /// Rejected value.
        value: f64,
        /// Lower bound of the domain.
        min: f64,
        /// Upper bound of the domain.
        max: f64,
    },
}

/// Interpolates `value` between the calibration points.
///
/// Larger inputs map to smaller intervals: `map(0.009) == 10` and
/// `map(0.5) == 1`. NaN is rejected along with out-of-range values.
pub fn map(value: f64) -> Result<f64, SpeedError> {
    if !(MIN_VALUE..=MAX_VALUE).contains(&value) {
        return Err(SpeedError::OutOfRange {
            value,
            min: MIN_VALUE,
            max: MAX_VALUE,
        });
    }

    Ok(interpolate(value))
}

fn interpolate(value: f64) -> f64 {
    SLOWEST_INTERVAL
        + (value - MIN_VALUE) * (FASTEST_INTERVAL - SLOWEST_INTERVAL) / (MAX_VALUE - MIN_VALUE)
}

/// Validated slider position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpeedSetting {
    value: f64,
    interval: f64,
}

impl SpeedSetting {
    /// Validates the slider value.
    pub fn new(value: f64) -> Result<Self, SpeedError> {
        let interval = map(value)?;
        Ok(Self { value, interval })
    }

    /// Raw slider value.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }

    /// Mapped interval shown as the speed multiplier.
    #[must_use]
    pub const fn interval(&self) -> f64 {
        self.interval
    }

    /// Host time between two scheduled generations.
    #[must_use]
    pub fn tick_period(&self) -> Duration {
        Duration::from_secs_f64(self.value)
    }

    /// Human-readable label, e.g. `GAME SPEED: 8.3x`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("GAME SPEED: {:.1}x", self.interval)
    }
}

impl Default for SpeedSetting {
    fn default() -> Self {
        Self {
            value: DEFAULT_VALUE,
            interval: interpolate(DEFAULT_VALUE),
        }
    }
}
