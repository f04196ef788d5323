//! # Acceleration Estimator
//!
//! Rate of change of the throttle pulse, sampled at a fixed interval that is
//! independent of the cycle rate.
//!
//! The raw difference between the current and the last sampled pulse is
//! multiplied by the side of neutral the last sampled pulse was on:
//!
//! | Last sampled pulse | Factor |
//! |--------------------|--------|
//! | above neutral      | +1 |
//! | below neutral      | -1 |
//! | at neutral         |  0 |
//!
//! Moving the stick away from neutral therefore reads positive ("speeding
//! up") and moving it back reads negative, whichever way the car travels.
//! Releasing the stick straight to neutral counts as slowing down. Pulling
//! away from neutral reads 0 for the first sample.

use super::classifier::Side;

/// Default sampling interval in milliseconds.
pub const DEFAULT_ACCELERATION_INTERVAL_MS: u32 = 200;

/// Throttle acceleration estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccelerationEstimator {
    interval_ms: u32,
    last_value: u32,
    last_side: Side,
    last_sampled_ms: u32,
    acceleration: i32,
}

impl Default for AccelerationEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_ACCELERATION_INTERVAL_MS)
    }
}

impl AccelerationEstimator {
    /// Creates an estimator that resamples every `interval_ms`.
    #[must_use]
    pub fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms,
            last_value: 0,
            last_side: Side::Center,
            last_sampled_ms: 0,
            acceleration: 0,
        }
    }

    /// Restarts sampling from a neutral `value` at `now_ms` with zero
    /// acceleration.
    pub fn reset(&mut self, value: u32, now_ms: u32) {
        self.last_value = value;
        self.last_side = Side::Center;
        self.last_sampled_ms = now_ms;
        self.acceleration = 0;
    }

    /// Feeds the current throttle pulse.
    ///
    /// # Arguments
    ///
    /// * `value` - Raw throttle pulse width in µs
    /// * `side` - Position classification of `value`, kept as the factor of
    ///   the next sample
    /// * `now_ms` - Current clock reading
    ///
    /// # Returns
    ///
    /// The new estimate once more than the interval has passed since the
    /// last sample, otherwise the previous estimate unchanged.
    pub fn update(&mut self, value: u32, side: Side, now_ms: u32) -> i32 {
        if now_ms.wrapping_sub(self.last_sampled_ms) > self.interval_ms {
            let raw = i64::from(value) - i64::from(self.last_value);
            let factor = match self.last_side {
                Side::High => 1,
                Side::Center => 0,
                Side::Low => -1,
            };
            self.acceleration =
                (raw * factor).clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
            self.last_value = value;
            self.last_side = side;
            self.last_sampled_ms = now_ms;
        }
        self.acceleration
    }

    /// Latest estimate. Positive = speeding up, negative = slowing down.
    #[must_use]
    pub fn acceleration(&self) -> i32 {
        self.acceleration
    }
}
